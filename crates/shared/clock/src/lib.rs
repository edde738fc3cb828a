//! Bazaar Clock Infrastructure
//!
//! Time source for session bookkeeping and timestamps:
//!
//! - [`SystemClock`] returns wall-clock time (production)
//! - [`ManualClock`] only moves when told to (deterministic tests)
//!
//! ## Usage
//!
//! ```ignore
//! use bazaar_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::starting_now();
//! let t0 = clock.now();
//! clock.advance(Duration::seconds(30));
//! assert_eq!(clock.now() - t0, Duration::seconds(30));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

use bazaar_core::Timestamp;

/// Port for time abstraction
///
/// This allows the store to use different time sources:
/// - Real system time for production
/// - Manually advanced time for deterministic tests
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
