//! Test clock: a `Clock` that never moves.

use chrono::{DateTime, TimeZone, Utc};
use dreamnet_core::event::Clock;

/// A clock stopped at one instant, so event timestamps can be asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// The instant [`FixedClock::default`] is stopped at: 2026-03-01 09:30 UTC.
    #[must_use]
    pub fn reference_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self(Self::reference_instant())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
