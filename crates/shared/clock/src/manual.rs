use bazaar_core::Timestamp;
use chrono::{Duration, Utc};
use parking_lot::RwLock;

use crate::Clock;

/// Clock that stands still until advanced
///
/// Used by tests to step through session idle timeouts without sleeping.
pub struct ManualClock {
    current: RwLock<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    /// Start at the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move time forward. Negative durations are ignored.
    pub fn advance(&self, by: Duration) {
        if by <= Duration::zero() {
            return;
        }
        let mut current = self.current.write();
        *current += by;
    }

    /// Jump to an absolute instant (used to simulate clock steps)
    pub fn set(&self, to: Timestamp) {
        *self.current.write() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.read()
    }

    fn name(&self) -> &str {
        "manual"
    }
}
