use chrono::{DateTime, Duration, Utc};

use super::upgrade::UpgradePolicy;
use super::window::{parse_duration_label, parse_instant};
use super::ScheduleError;
use crate::crd::rhmi_config::{RHMIConfigSpec, RHMIConfigStatus, MAINTENANCE_WINDOW_HOURS};

/// Hours at the end of a window in which no upgrade is started
pub const WINDOW_MARGIN_HOURS: i64 = 1;

/// Whether `now` falls inside the window of the persisted upgrade schedule
///
/// The window opens at the scheduled instant and lasts the persisted
/// maintenance duration when waiting for maintenance, otherwise the default
/// window length. The last hour of the window is excluded.
pub fn upgrade_window_open(
    spec: &RHMIConfigSpec,
    status: &RHMIConfigStatus,
    now: DateTime<Utc>,
) -> Result<bool, ScheduleError> {
    let Some(scheduled) = &status.upgrade.scheduled else {
        return Ok(false);
    };

    let hours = if UpgradePolicy::from(&spec.upgrade).wait_for_maintenance {
        parse_duration_label(&status.maintenance.duration)?
    } else {
        MAINTENANCE_WINDOW_HOURS
    };

    let start = parse_instant(&scheduled.scheduled_for)?;
    let end = Duration::try_hours(hours - WINDOW_MARGIN_HOURS)
        .and_then(|length| start.checked_add_signed(length))
        .ok_or(ScheduleError::OutOfRange)?;

    Ok(start < now && now < end)
}
