//! Cache Sweep Task
//!
//! Background task that periodically drops expired entries from the
//! in-memory cache. Redis expires keys on its own and needs no sweeper.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// Reads already ignore expired entries; the sweep only reclaims memory held
/// by keys nobody asks for again.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(MemoryCache::new());
/// let sweeper = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<MemoryCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            interval_secs = cleanup_interval_secs,
            "starting cache sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!(removed, "cache sweep removed expired entries");
            } else {
                debug!("cache sweep found no expired entries");
            }
        }
    })
}
