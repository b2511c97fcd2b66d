//! Background reclamation of expired payloads.

use super::PayloadCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default sweep cadence (2 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(120);

/// Spawn a task that purges expired entries from `cache` every `every`.
///
/// The task runs until the returned handle is aborted or the runtime shuts down.
pub fn spawn_sweeper(cache: Arc<PayloadCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let purged = cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "swept expired payloads");
            }
        }
    })
}
