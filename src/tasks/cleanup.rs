//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries and
//! prunes the request-metrics windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::metrics::RequestMetrics;

/// Spawns a background task that periodically sweeps both cache stores.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs. Each run removes expired entries from the raw and output
/// caches and drops request timestamps that left the largest window.
///
/// # Arguments
/// * `raw_cache` - Shared raw document cache
/// * `output_cache` - Shared filtered output cache
/// * `metrics` - Shared request counters
/// * `interval` - Time between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    raw_cache: Arc<CacheStore>,
    output_cache: Arc<CacheStore>,
    metrics: Arc<RequestMetrics>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let removed = raw_cache.cleanup_expired() + output_cache.cleanup_expired();
            let pruned = metrics.prune();

            // Log cleanup statistics
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
            if pruned > 0 {
                debug!("Metrics prune: dropped {} stale request timestamps", pruned);
            }
        }
    })
}
