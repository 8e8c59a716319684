use crate::controller::clock::{Clock, SystemClock};
use crate::controller::schedule::{upgrade_window_open, validate_config, ScheduleError};
use crate::crd::rhmi_config::{RHMIConfig, UpgradeStatus};
use crate::server::SharedMetrics;
use kube::runtime::controller::Action;
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::status::{project_status, ProjectionError, ProjectionOutcome};
use super::store::{KubeStatusStore, StatusStore, StoreError};

/// Requeue interval after a successful reconciliation
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Requeue interval after a failed reconciliation
pub const RETRY_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("RHMIConfig missing namespace")]
    MissingNamespace,

    #[error("Status projection failed: {0}")]
    Projection(#[from] ProjectionError),

    #[error("Failed to persist RHMIConfig: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid RHMIConfig spec: {0}")]
    ValidationError(String),
}

pub struct Context {
    pub store: Arc<dyn StatusStore>,
    pub clock: Arc<dyn Clock>,
    /// Optional controller metrics for Prometheus
    pub metrics: Option<SharedMetrics>,
}

impl Context {
    pub fn new(client: kube::Client, metrics: Option<SharedMetrics>) -> Self {
        Context {
            store: Arc::new(KubeStatusStore::new(client)),
            clock: Arc::new(SystemClock),
            metrics,
        }
    }

    /// Context over arbitrary store and clock implementations
    pub fn with_parts(
        store: Arc<dyn StatusStore>,
        clock: Arc<dyn Clock>,
        metrics: Option<SharedMetrics>,
    ) -> Self {
        Context {
            store,
            clock,
            metrics,
        }
    }
}

/// Reconcile an RHMIConfig resource
///
/// 1. Writes defaults for blank spec values back to the resource
/// 2. Projects maintenance window and upgrade schedule onto status when an
///    upgrade is available, otherwise clears the upgrade schedule
/// 3. Validates backup and maintenance times
/// 4. Reports whether the scheduled upgrade window is currently open
pub async fn reconcile(
    config: Arc<RHMIConfig>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start_time = std::time::Instant::now();
    let result = reconcile_inner(&config, &ctx).await;

    if let Some(ref metrics) = ctx.metrics {
        let duration = start_time.elapsed().as_secs_f64();
        match &result {
            Ok(_) => metrics.record_reconciliation_success(duration),
            Err(_) => metrics.record_reconciliation_error(duration),
        }
    }

    result
}

async fn reconcile_inner(config: &RHMIConfig, ctx: &Context) -> Result<Action, ReconcileError> {
    let namespace = config
        .namespace()
        .ok_or(ReconcileError::MissingNamespace)?;
    let name = config.name_any();

    info!(config = ?name, namespace = ?namespace, "Reconciling RHMIConfig");

    // Defaults go in before projection, a blank maintenance window cannot be scheduled
    let mut config = config.clone();
    let defaulted = config.spec.with_defaults();
    if defaulted != config.spec {
        info!(config = ?name, "Writing default values to RHMIConfig spec");
        match ctx.store.patch_spec(&namespace, &name, &defaulted).await {
            Err(StoreError::NotFound { .. }) => return Ok(gone(ctx, &namespace, &name)),
            other => other?,
        }
        config.spec = defaulted;
    }

    let upgrade_available = config
        .status
        .as_ref()
        .is_some_and(|status| status.upgrade_available.is_some());

    let status = if upgrade_available {
        match project_status(&config, ctx.store.as_ref(), ctx.clock.as_ref()).await? {
            ProjectionOutcome::Gone => return Ok(gone(ctx, &namespace, &name)),
            ProjectionOutcome::Scheduled(status) | ProjectionOutcome::ScheduleCleared(status) => {
                status
            }
        }
    } else {
        debug!(config = ?name, "No upgrade available, clearing upgrade schedule");
        let mut status = config.status.clone().unwrap_or_default();
        status.upgrade = UpgradeStatus::default();
        match ctx
            .store
            .patch_upgrade(&namespace, &name, &status.upgrade)
            .await
        {
            Err(StoreError::NotFound { .. }) => return Ok(gone(ctx, &namespace, &name)),
            other => other?,
        }
        status
    };

    let times = validate_config(&config.spec).map_err(|validation_error| {
        error!(
            config = ?name,
            error = ?validation_error,
            "RHMIConfig spec validation failed"
        );
        ReconcileError::ValidationError(validation_error)
    })?;
    debug!(
        config = ?name,
        backup_start_time = %times.backup_start_time,
        maintenance_start_time = %times.maintenance_start_time,
        "Backup and maintenance times validated"
    );

    report_upgrade_window(
        ctx,
        &namespace,
        &name,
        upgrade_window_open(&config.spec, &status, ctx.clock.now()),
    );

    info!(config = ?name, "RHMIConfig reconciled successfully");
    Ok(Action::requeue(RESYNC_INTERVAL))
}

/// Log and export the upgrade window state, an unreadable window counts as closed
pub(crate) fn report_upgrade_window(
    ctx: &Context,
    namespace: &str,
    name: &str,
    window: Result<bool, ScheduleError>,
) {
    let open = match window {
        Ok(open) => {
            if open {
                info!(config = ?name, namespace = ?namespace, "Upgrade window is open");
            }
            open
        }
        Err(e) => {
            warn!(config = ?name, error = %e, "Could not evaluate upgrade window");
            false
        }
    };
    if let Some(ref metrics) = ctx.metrics {
        metrics.set_upgrade_window_open(namespace, name, open);
    }
}

/// The resource was deleted mid-reconcile: drop its metrics and wait for the next event
fn gone(ctx: &Context, namespace: &str, name: &str) -> Action {
    if let Some(ref metrics) = ctx.metrics {
        metrics.forget_config(namespace, name);
    }
    Action::await_change()
}

/// Error policy for the controller
///
/// Uses `warn!` since reconciliation errors are expected and trigger retries.
pub fn error_policy(config: Arc<RHMIConfig>, error: &ReconcileError, _ctx: Arc<Context>) -> Action {
    warn!(config = ?config.name_any(), "Reconcile error (will retry): {:?}", error);
    Action::requeue(RETRY_INTERVAL)
}
