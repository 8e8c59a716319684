use chrono::{DateTime, Duration, Utc};

use super::window::{add_days, format_instant, resolve_window};
use super::ScheduleError;
use crate::crd::rhmi_config::{
    Upgrade, UpgradeAvailable, UpgradeSchedule, DEFAULT_NOT_BEFORE_DAYS, DEFAULT_SCHEDULE,
    DEFAULT_WAIT_FOR_MAINTENANCE, MAINTENANCE_WINDOW_HOURS,
};

/// A newer version and the instant it became available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeAvailability {
    pub available_at: DateTime<Utc>,
    pub target_version: String,
}

impl UpgradeAvailability {
    pub fn from_status(available: &UpgradeAvailable) -> Result<Self, ScheduleError> {
        let available_at = DateTime::parse_from_rfc3339(&available.available_at)
            .map_err(|e| ScheduleError::InvalidTimestamp {
                value: available.available_at.clone(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(UpgradeAvailability {
            available_at,
            target_version: available.target_version.clone(),
        })
    }
}

/// How an available upgrade turns into a scheduled one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradePolicy {
    pub not_before_days: i64,
    pub wait_for_maintenance: bool,
    pub schedule_enabled: bool,
}

impl Default for UpgradePolicy {
    fn default() -> Self {
        UpgradePolicy {
            not_before_days: i64::from(DEFAULT_NOT_BEFORE_DAYS),
            wait_for_maintenance: DEFAULT_WAIT_FOR_MAINTENANCE,
            schedule_enabled: DEFAULT_SCHEDULE,
        }
    }
}

impl From<&Upgrade> for UpgradePolicy {
    fn from(upgrade: &Upgrade) -> Self {
        let defaults = UpgradePolicy::default();
        UpgradePolicy {
            not_before_days: upgrade
                .not_before_days
                .map(i64::from)
                .unwrap_or(defaults.not_before_days),
            wait_for_maintenance: upgrade
                .wait_for_maintenance
                .unwrap_or(defaults.wait_for_maintenance),
            schedule_enabled: upgrade.schedule.unwrap_or(defaults.schedule_enabled),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleResult {
    /// Scheduling is switched off, any stored schedule is dropped
    Disabled,
    ScheduledFor(DateTime<Utc>),
}

impl ScheduleResult {
    pub fn to_status(&self) -> Option<UpgradeSchedule> {
        match self {
            ScheduleResult::Disabled => None,
            ScheduleResult::ScheduledFor(instant) => Some(UpgradeSchedule {
                scheduled_for: format_instant(*instant),
            }),
        }
    }
}

/// Length of every maintenance window
pub fn maintenance_window_duration() -> Duration {
    Duration::hours(MAINTENANCE_WINDOW_HOURS)
}

/// Compute when an available upgrade should be applied
///
/// The upgrade is held back `not_before_days` after it became available. When
/// waiting for maintenance it then moves to the start of the maintenance
/// window occurring on or after that day. A negative notice period is rejected.
pub fn compute_upgrade_schedule(
    availability: &UpgradeAvailability,
    policy: &UpgradePolicy,
    maintenance_spec: &str,
) -> Result<ScheduleResult, ScheduleError> {
    if !policy.schedule_enabled {
        return Ok(ScheduleResult::Disabled);
    }

    if policy.not_before_days < 0 {
        return Err(ScheduleError::NegativeNotBeforeDays(policy.not_before_days));
    }

    let candidate = add_days(availability.available_at, policy.not_before_days)
        .ok_or(ScheduleError::OutOfRange)?;

    if !policy.wait_for_maintenance {
        return Ok(ScheduleResult::ScheduledFor(candidate));
    }

    let window = resolve_window(candidate, maintenance_spec, maintenance_window_duration())?;
    Ok(ScheduleResult::ScheduledFor(window.start))
}
