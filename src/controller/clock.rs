//! Source of "now" for maintenance windows and upgrade schedules
//!
//! The reconciler resolves the next maintenance window relative to the current
//! instant. `SystemClock` reads the wall clock; tests inject `MockClock` so the
//! resolved windows are deterministic.

use chrono::{DateTime, Utc};

/// Trait for getting the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, always UTC
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock for tests
#[cfg(test)]
#[allow(clippy::expect_used)]
pub struct MockClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MockClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    /// Clock frozen at `YYYY-MM-DD HH:MM:00` UTC
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        use chrono::TimeZone;
        Self::new(
            Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
                .single()
                .expect("valid test instant"),
        )
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.lock().expect("MockClock lock poisoned");
        *now += duration;
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("MockClock lock poisoned")
    }
}
