//! Test clock — deterministic `Clock` implementation for tests.

use chrono::{DateTime, Duration, Utc};
use questboard_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Returns a clock fixed `seconds` later. Useful for pinning the review
    /// queue's submission order.
    #[must_use]
    pub fn later_by(self, seconds: i64) -> Self {
        Self(self.0 + Duration::seconds(seconds))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
