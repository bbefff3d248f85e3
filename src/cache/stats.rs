//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions,
//! and defines the serializable snapshot returned by the store.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance counters.
///
/// Counters are cumulative for the store's lifetime; clearing the store
/// does not reset them.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted by capacity or memory pressure
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Ratio ==
    /// Calculates the cache hit ratio.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Stats Snapshot ==
/// Point-in-time view of one store, as exposed by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Current number of entries
    pub entry_count: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Approximate bytes currently accounted to entries
    pub memory_used: usize,
    /// Maximum accounted bytes
    pub memory_budget: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// hits / (hits + misses), 0.0 when no lookups yet
    pub hit_ratio: f64,
    pub default_ttl_secs: u64,
    pub min_ttl_secs: u64,
    pub max_ttl_secs: u64,
}
