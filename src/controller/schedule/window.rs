use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc, Weekday};
use std::fmt;

use super::ScheduleError;
use crate::crd::rhmi_config::{DATE_FORMAT, DATE_PARSE_FORMAT};

/// Day token of a window spec after lookup
///
/// Unknown day names do not fail: they resolve to Sunday, which is what
/// existing resources have always been scheduled with. The fallback is kept
/// as its own variant so callers can see and report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfWeek {
    Known(Weekday),
    DefaultedToSunday,
}

impl DayOfWeek {
    /// Case-insensitive lookup of a three-letter English day name
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "sun" => DayOfWeek::Known(Weekday::Sun),
            "mon" => DayOfWeek::Known(Weekday::Mon),
            "tue" => DayOfWeek::Known(Weekday::Tue),
            "wed" => DayOfWeek::Known(Weekday::Wed),
            "thu" => DayOfWeek::Known(Weekday::Thu),
            "fri" => DayOfWeek::Known(Weekday::Fri),
            "sat" => DayOfWeek::Known(Weekday::Sat),
            _ => DayOfWeek::DefaultedToSunday,
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            DayOfWeek::Known(day) => day,
            DayOfWeek::DefaultedToSunday => Weekday::Sun,
        }
    }

    pub fn is_defaulted(self) -> bool {
        matches!(self, DayOfWeek::DefaultedToSunday)
    }
}

/// Weekly recurrence parsed from `"<day> <HH:MM>"`, e.g. `"Thu 02:00"`
///
/// Hour and minute are only required to be integers. They are applied as
/// offsets from midnight, so `"mon 25:00"` lands on Tuesday 01:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub day: DayOfWeek,
    pub hour: i64,
    pub minute: i64,
}

impl WindowSpec {
    pub fn parse(spec: &str) -> Result<Self, ScheduleError> {
        let (day_token, time_token) = split_pair(spec, ' ')
            .ok_or_else(|| ScheduleError::WindowFormat(spec.to_string()))?;
        let (hour_token, minute_token) = split_pair(time_token, ':')
            .ok_or_else(|| ScheduleError::TimeFormat(time_token.to_string()))?;

        Ok(WindowSpec {
            day: DayOfWeek::parse(day_token),
            hour: parse_integer("hour", hour_token, spec)?,
            minute: parse_integer("minute", minute_token, spec)?,
        })
    }

    /// Offset of the window start from midnight
    fn time_of_day(&self) -> Option<Duration> {
        Duration::try_hours(self.hour)?.checked_add(&Duration::try_minutes(self.minute)?)
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}",
            self.day.weekday(),
            self.hour,
            self.minute
        )
    }
}

/// Split into exactly two parts on `separator`
fn split_pair(value: &str, separator: char) -> Option<(&str, &str)> {
    let mut parts = value.split(separator);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) => Some((first, second)),
        _ => None,
    }
}

fn parse_integer(field: &'static str, value: &str, spec: &str) -> Result<i64, ScheduleError> {
    value.parse().map_err(|_| ScheduleError::NotAnInteger {
        field,
        value: value.to_string(),
        spec: spec.to_string(),
    })
}

/// Resolved occurrence of a weekly window, `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Resolve the occurrence of `spec` on the reference day or within the six days after it
///
/// When the reference day already is the window's weekday the window starts
/// that same day, even if its start time has passed.
pub fn resolve_window(
    reference: DateTime<Utc>,
    spec: &str,
    duration: Duration,
) -> Result<Window, ScheduleError> {
    let spec = WindowSpec::parse(spec)?;
    resolve_parsed_window(reference, &spec, duration)
}

pub fn resolve_parsed_window(
    reference: DateTime<Utc>,
    spec: &WindowSpec,
    duration: Duration,
) -> Result<Window, ScheduleError> {
    let target = i64::from(spec.day.weekday().num_days_from_sunday());
    let current = i64::from(reference.weekday().num_days_from_sunday());
    let mut day_diff = target - current;
    if day_diff < 0 {
        day_diff += 7;
    }

    let midnight = reference
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or(ScheduleError::OutOfRange)?
        .and_utc();
    let start = spec
        .time_of_day()
        .and_then(|offset| midnight.checked_add_signed(offset))
        .and_then(|start| add_days(start, day_diff))
        .ok_or(ScheduleError::OutOfRange)?;
    let end = start
        .checked_add_signed(duration)
        .ok_or(ScheduleError::OutOfRange)?;

    Ok(Window { start, end })
}

/// Move `instant` by whole calendar days, forwards or backwards
///
/// Returns `None` when the result is outside chrono's supported range.
pub fn add_days(instant: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    instant.checked_add_signed(Duration::try_days(days)?)
}

/// Format an instant for status with [`DATE_FORMAT`]
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(DATE_FORMAT).to_string()
}

/// Parse an instant previously written by [`format_instant`]
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, ScheduleError> {
    NaiveDateTime::parse_from_str(value, DATE_PARSE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ScheduleError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// `"6hrs"` style label for a window length
pub fn duration_label(hours: i64) -> String {
    format!("{}hrs", hours)
}

/// Inverse of [`duration_label`]
pub fn parse_duration_label(label: &str) -> Result<i64, ScheduleError> {
    label
        .strip_suffix("hrs")
        .and_then(|hours| hours.parse().ok())
        .ok_or_else(|| ScheduleError::InvalidDuration(label.to_string()))
}
