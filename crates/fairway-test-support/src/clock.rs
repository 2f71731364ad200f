//! A clock pinned to one instant, for exercising schedule validation
//! deterministically.

use chrono::{DateTime, Utc};
use fairway_core::clock::Clock;

/// A `Clock` whose `now` never advances.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Pins the clock to `instant`.
    #[must_use]
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
