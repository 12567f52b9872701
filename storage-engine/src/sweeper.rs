use bazaar::ports::CacheStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawn the periodic expiry sweep for a cache store.
///
/// Reads never serve expired entries, so the sweep exists only to reclaim
/// storage. A failed pass is logged and the task waits for the next tick.
pub fn spawn_sweeper(store: Arc<dyn CacheStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // An interval's first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.sweep_expired().await {
                Ok(0) => debug!("cache sweep found nothing to drop"),
                Ok(removed) => debug!("cache sweep dropped {} expired entries", removed),
                Err(e) => warn!("cache sweep failed: {}", e),
            }
        }
    })
}
