//! Periodic removal of idle sessions
//!
//! Lazy expiry already keeps expired sessions unreadable; the sweeper only
//! bounds memory held by sessions nobody touches again.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::market::MarketStore;

/// Shortest period accepted; smaller values are raised to this
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn a task that calls [`MarketStore::sweep_expired_sessions`] every
/// `every`. Abort the handle to stop it.
pub fn spawn_session_sweeper(store: Arc<MarketStore>, every: Duration) -> JoinHandle<()> {
    let every = every.max(MIN_SWEEP_INTERVAL);
    info!("Starting session sweeper with interval of {}ms", every.as_millis());

    tokio::spawn(async move {
        let mut tick_interval = interval(every);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        tick_interval.tick().await;

        loop {
            tick_interval.tick().await;
            let removed = store.sweep_expired_sessions();
            debug!("sweep pass removed {} sessions", removed);
        }
    })
}
