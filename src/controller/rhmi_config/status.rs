use crate::controller::clock::Clock;
use crate::controller::schedule::{
    compute_upgrade_schedule, duration_label, format_instant, maintenance_window_duration,
    resolve_parsed_window, ScheduleError, UpgradeAvailability, UpgradePolicy, WindowSpec,
};
use crate::crd::rhmi_config::{
    MaintenanceStatus, RHMIConfig, RHMIConfigStatus, UpgradeStatus, MAINTENANCE_WINDOW_HOURS,
};
use kube::ResourceExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::store::{StatusStore, StoreError};

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("RHMIConfig missing namespace")]
    MissingNamespace,

    #[error("RHMIConfig has no available upgrade to schedule")]
    NoUpgradeAvailable,

    #[error("Invalid schedule configuration: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Failed to persist status: {0}")]
    Store(#[source] StoreError),
}

/// Result of a successful projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionOutcome {
    /// Maintenance window refreshed and upgrade schedule written
    Scheduled(RHMIConfigStatus),
    /// Scheduling disabled, stored schedule removed
    ScheduleCleared(RHMIConfigStatus),
    /// The resource was deleted while projecting
    Gone,
}

/// Status block for the next occurrence of the maintenance window
pub fn maintenance_status(
    config: &RHMIConfig,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Option<MaintenanceStatus>, ScheduleError> {
    let apply_from = &config.spec.maintenance.apply_from;
    if apply_from.is_empty() {
        return Ok(None);
    }

    let spec = WindowSpec::parse(apply_from)?;
    if spec.day.is_defaulted() {
        warn!(
            config = ?config.name_any(),
            apply_from = %apply_from,
            "Unknown maintenance day, scheduling on Sunday"
        );
    }

    let window = resolve_parsed_window(now, &spec, maintenance_window_duration())?;
    Ok(Some(MaintenanceStatus {
        apply_from: format_instant(window.start),
        duration: duration_label(MAINTENANCE_WINDOW_HOURS),
    }))
}

/// Project the maintenance window and upgrade schedule of `config` onto its status
///
/// Writes happen in a fixed order and are not atomic:
/// 1. scheduling disabled: clear `status.upgrade.scheduled` and stop
/// 2. refresh `status.maintenance` from the window next to `clock.now()`
/// 3. write `status.upgrade.scheduled`
///
/// A failure after step 2 leaves the refreshed maintenance window in place.
/// Every value is recomputed from the current time, so retrying the whole
/// projection is safe.
///
/// # Returns
/// * `Ok(ProjectionOutcome)` - status as persisted, or `Gone` if the resource was deleted
/// * `Err(ProjectionError)` - invalid window spec or failed write
pub async fn project_status(
    config: &RHMIConfig,
    store: &dyn StatusStore,
    clock: &dyn Clock,
) -> Result<ProjectionOutcome, ProjectionError> {
    let namespace = config
        .namespace()
        .ok_or(ProjectionError::MissingNamespace)?;
    let name = config.name_any();

    let available = config
        .status
        .as_ref()
        .and_then(|status| status.upgrade_available.as_ref())
        .ok_or(ProjectionError::NoUpgradeAvailable)?;

    let mut status = config.status.clone().unwrap_or_default();
    let policy = UpgradePolicy::from(&config.spec.upgrade);

    if !policy.schedule_enabled {
        debug!(config = ?name, namespace = ?namespace, "Upgrade scheduling disabled");
        status.upgrade = UpgradeStatus::default();
        if let Some(outcome) = persist(store.patch_upgrade(&namespace, &name, &status.upgrade).await)? {
            return Ok(outcome);
        }
        return Ok(ProjectionOutcome::ScheduleCleared(status));
    }

    if let Some(maintenance) = maintenance_status(config, clock.now())? {
        debug!(
            config = ?name,
            apply_from = %maintenance.apply_from,
            "Refreshing maintenance window"
        );
        status.maintenance = maintenance;
        if let Some(outcome) =
            persist(store.patch_maintenance(&namespace, &name, &status.maintenance).await)?
        {
            return Ok(outcome);
        }
    }

    let availability = UpgradeAvailability::from_status(available)?;
    let schedule = compute_upgrade_schedule(
        &availability,
        &policy,
        &config.spec.maintenance.apply_from,
    )?;

    status.upgrade = UpgradeStatus {
        scheduled: schedule.to_status(),
    };
    if let Some(outcome) = persist(store.patch_upgrade(&namespace, &name, &status.upgrade).await)? {
        return Ok(outcome);
    }

    info!(
        config = ?name,
        namespace = ?namespace,
        target_version = %availability.target_version,
        scheduled_for = ?status.upgrade.scheduled.as_ref().map(|s| s.scheduled_for.as_str()),
        "Upgrade schedule updated"
    );

    Ok(ProjectionOutcome::Scheduled(status))
}

/// `Some(Gone)` when the write found no resource, `None` when it succeeded
fn persist(result: Result<(), StoreError>) -> Result<Option<ProjectionOutcome>, ProjectionError> {
    match result {
        Ok(()) => Ok(None),
        Err(StoreError::NotFound { namespace, name }) => {
            debug!(config = ?name, namespace = ?namespace, "RHMIConfig gone, skipping status update");
            Ok(Some(ProjectionOutcome::Gone))
        }
        Err(e) => Err(ProjectionError::Store(e)),
    }
}
