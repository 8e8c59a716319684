//! Maintenance window and upgrade schedule arithmetic
//!
//! Everything in here is pure: callers pass the reference instant in, nothing
//! reads the clock or talks to the API server.

pub mod approval;
pub mod upgrade;
pub mod validation;
pub mod window;

pub use approval::*;
pub use upgrade::*;
pub use validation::*;
pub use window::*;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("expected window format `DDD HH:mm`, found '{0}'")]
    WindowFormat(String),

    #[error("expected time format `HH:mm`, found '{0}'")]
    TimeFormat(String),

    #[error("invalid {field} '{value}' in '{spec}': not an integer")]
    NotAnInteger {
        field: &'static str,
        value: String,
        spec: String,
    },

    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("invalid maintenance duration '{0}', expected `<N>hrs`")]
    InvalidDuration(String),

    #[error("notBeforeDays must be >= 0, got {0}")]
    NegativeNotBeforeDays(i64),

    #[error("schedule falls outside the supported date range")]
    OutOfRange,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "schedule_test.rs"]
mod tests;
