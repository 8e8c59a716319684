use chrono::{Duration, NaiveTime, Timelike};

use super::window::DayOfWeek;
use crate::crd::rhmi_config::{
    RHMIConfigSpec, DEFAULT_BACKUP_APPLY_ON, DEFAULT_MAINTENANCE_APPLY_FROM,
};

/// Backup and maintenance start times handed to cloud resource strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTimeConfig {
    pub backup_start_time: String,
    pub maintenance_start_time: String,
}

/// Validate the timing fields of an RHMIConfig
///
/// Validates runtime constraints that cannot be enforced via CRD schema.
///
/// # Validation Rules
/// - `spec.upgrade.notBeforeDays` must be >= 0
/// - backup and maintenance times must be well formed and must not overlap
///
/// # Returns
/// * `Ok(StrategyTimeConfig)` - the (defaulted) times that passed validation
/// * `Err(String)` - Validation error message
pub fn validate_config(spec: &RHMIConfigSpec) -> Result<StrategyTimeConfig, String> {
    if let Some(days) = spec.upgrade.not_before_days {
        if days < 0 {
            return Err(format!(
                "spec.upgrade.notBeforeDays must be >= 0, got {}",
                days
            ));
        }
    }

    validate_backup_and_maintenance(&spec.backup.apply_on, &spec.maintenance.apply_from)
}

/// Check backup and maintenance times
///
/// Blank values are replaced by their defaults. Both times are treated as one
/// hour windows on the time of day, and those windows may not overlap.
pub fn validate_backup_and_maintenance(
    backup_apply_on: &str,
    maintenance_apply_from: &str,
) -> Result<StrategyTimeConfig, String> {
    let backup_apply_on = if backup_apply_on.is_empty() {
        DEFAULT_BACKUP_APPLY_ON
    } else {
        backup_apply_on
    };
    let maintenance_apply_from = if maintenance_apply_from.is_empty() {
        DEFAULT_MAINTENANCE_APPLY_FROM
    } else {
        maintenance_apply_from
    };

    let backup_time = NaiveTime::parse_from_str(backup_apply_on, "%H:%M").map_err(|e| {
        format!(
            "failed to parse backup applyOn value: expected format HH:mm: {}",
            e
        )
    })?;

    let segments: Vec<&str> = maintenance_apply_from.split(' ').collect();
    let [day, time] = segments.as_slice() else {
        return Err(format!(
            "failed to parse maintenance applyFrom value: expected format DDD HH:mm, found {}",
            maintenance_apply_from
        ));
    };

    if DayOfWeek::parse(day).is_defaulted() {
        return Err(format!(
            "invalid maintenance applyFrom day: expected DDD HH:mm, found {}",
            maintenance_apply_from
        ));
    }

    let maintenance_time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|e| {
        format!(
            "failed to parse maintenance applyFrom value: expected DDD HH:mm, found {}: {}",
            maintenance_apply_from, e
        )
    })?;

    if one_hour_windows_overlap(backup_time, maintenance_time) {
        return Err(format!(
            "backup and maintenance times cannot overlap, backup window {} overlaps with maintenance window {}",
            hour_window_label(backup_time),
            hour_window_label(maintenance_time)
        ));
    }

    Ok(StrategyTimeConfig {
        backup_start_time: backup_apply_on.to_string(),
        maintenance_start_time: maintenance_apply_from.to_string(),
    })
}

/// `[a, a+1h]` and `[b, b+1h]` share any instant, both ends inclusive
///
/// Windows are compared on a single day, so 23:30 and 00:10 do not overlap.
fn one_hour_windows_overlap(a: NaiveTime, b: NaiveTime) -> bool {
    let a_start = minutes_of_day(a);
    let b_start = minutes_of_day(b);
    let hour = Duration::hours(1).num_minutes();

    a_start <= b_start + hour && a_start + hour >= b_start
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    Duration::seconds(i64::from(time.num_seconds_from_midnight())).num_minutes()
}

fn hour_window_label(start: NaiveTime) -> String {
    let end = start.overflowing_add_signed(Duration::hours(1)).0;
    format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
}
