//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, TTL
//! clamping, and capacity plus memory-budget eviction. All locking is
//! internal; callers share the store behind an `Arc` and call `&self`
//! methods directly.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::cache::{CacheEntry, CacheStats, LruTracker, StatsSnapshot};
use crate::error::{AppError, Result};

// == Store Inner ==
/// State guarded by the store mutex. Entries, recency order, memory
/// accounting, and counters always change together under one lock so no
/// reader can observe a partially applied operation.
struct StoreInner {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance counters
    stats: CacheStats,
    /// Sum of all current entries' weights
    memory_used: usize,
}

// == Cache Store ==
/// Bounded cache with LRU eviction, per-entry TTL, and memory accounting.
pub struct CacheStore {
    inner: Mutex<StoreInner>,
    /// Maximum number of entries
    capacity: usize,
    /// Maximum accounted bytes
    memory_budget: usize,
    /// TTL applied when the caller has no better value
    default_ttl: Duration,
    /// Lower clamp for every stored TTL
    min_ttl: Duration,
    /// Upper clamp for every stored TTL
    max_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given bounds.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, must be nonzero
    /// * `memory_budget` - Maximum accounted bytes, must be nonzero
    /// * `default_ttl` - TTL used when a caller has none
    /// * `min_ttl` - Lower clamp applied to every stored TTL
    /// * `max_ttl` - Upper clamp applied to every stored TTL
    ///
    /// # Errors
    /// Returns a configuration error when `capacity` or `memory_budget`
    /// is zero. Misconfiguration is rejected here, never at request time.
    pub fn new(
        capacity: usize,
        memory_budget: usize,
        default_ttl: Duration,
        min_ttl: Duration,
        max_ttl: Duration,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(AppError::Config("cache capacity must be nonzero".into()));
        }
        if memory_budget == 0 {
            return Err(AppError::Config(
                "cache memory budget must be nonzero".into(),
            ));
        }

        Ok(Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                stats: CacheStats::new(),
                memory_used: 0,
            }),
            capacity,
            memory_budget,
            default_ttl,
            min_ttl,
            max_ttl,
        })
    }

    // == Set ==
    /// Stores a payload under a key, evicting as needed to stay in budget.
    ///
    /// The TTL is clamped into `[min_ttl, max_ttl]` before the expiry is
    /// computed, including a zero TTL. An existing entry under the same key
    /// is removed outright first, so an overwrite releases its memory
    /// exactly once and never evicts an unrelated key. Eviction runs until
    /// the new entry fits (or the store is empty), then the entry is
    /// inserted as most recently used.
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `payload` - The document bytes to store
    /// * `ttl` - Requested time-to-live, clamped before use
    /// * `etag` - Optional origin entity tag for later revalidation
    /// * `last_modified` - Optional origin timestamp for later revalidation
    pub fn set(
        &self,
        key: String,
        payload: Bytes,
        ttl: Duration,
        etag: Option<String>,
        last_modified: Option<String>,
    ) {
        let clamped = ttl.min(self.max_ttl).max(self.min_ttl);
        let entry = CacheEntry::new(payload, clamped, etag, last_modified);
        let weight = entry.weight();

        let inner = &mut *self.inner.lock();

        if let Some(old) = inner.entries.remove(&key) {
            inner.memory_used -= old.weight();
            inner.lru.remove(&key);
        }

        // Evict before inserting so the store is never observably over
        // budget. The loop may empty the store entirely when a single
        // payload outweighs the whole budget; the entry is stored anyway.
        while (inner.entries.len() >= self.capacity
            || inner.memory_used + weight > self.memory_budget)
            && !inner.entries.is_empty()
        {
            match inner.lru.evict_oldest() {
                Some(oldest) => {
                    if let Some(evicted) = inner.entries.remove(&oldest) {
                        inner.memory_used -= evicted.weight();
                    }
                    inner.stats.record_eviction();
                }
                None => break,
            }
        }

        inner.memory_used += weight;
        inner.lru.touch(&key);
        inner.entries.insert(key, entry);
    }

    // == Get ==
    /// Retrieves an entry by key.
    ///
    /// Returns the entry only if present and unexpired; an expired entry
    /// is removed as a side effect and counted as a miss. Every call
    /// increments exactly one of the hit or miss counters, and a hit
    /// refreshes the entry's recency.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let inner = &mut *self.inner.lock();

        let Some(entry) = inner.entries.get(key).cloned() else {
            inner.stats.record_miss();
            return None;
        };

        if entry.is_expired() {
            inner.entries.remove(key);
            inner.lru.remove(key);
            inner.memory_used -= entry.weight();
            inner.stats.record_miss();
            return None;
        }

        inner.stats.record_hit();
        inner.lru.touch(key);
        Some(entry)
    }

    // == Delete ==
    /// Removes an entry by key and releases its memory. No-op if absent.
    pub fn delete(&self, key: &str) {
        let inner = &mut *self.inner.lock();

        if let Some(old) = inner.entries.remove(key) {
            inner.memory_used -= old.weight();
            inner.lru.remove(key);
        }
    }

    // == Clear ==
    /// Removes all entries and resets memory usage to zero.
    ///
    /// The hit, miss, and eviction counters are lifetime totals and are
    /// not reset by a clear.
    pub fn clear(&self) {
        let inner = &mut *self.inner.lock();

        inner.entries.clear();
        inner.lru.clear();
        inner.memory_used = 0;
    }

    // == Cleanup Expired ==
    /// Removes every currently-expired entry, independent of access.
    ///
    /// Returns the number of entries removed. Does not touch the hit or
    /// miss counters; only reads through `get` count as lookups.
    pub fn cleanup_expired(&self) -> usize {
        let inner = &mut *self.inner.lock();

        let expired_keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            if let Some(old) = inner.entries.remove(&key) {
                inner.memory_used -= old.weight();
            }
            inner.lru.remove(&key);
        }

        count
    }

    // == Stats ==
    /// Returns a point-in-time snapshot of counters and occupancy.
    pub fn stats(&self) -> StatsSnapshot {
        let inner = self.inner.lock();

        StatsSnapshot {
            entry_count: inner.entries.len(),
            capacity: self.capacity,
            memory_used: inner.memory_used,
            memory_budget: self.memory_budget,
            hits: inner.stats.hits,
            misses: inner.stats.misses,
            evictions: inner.stats.evictions,
            hit_ratio: inner.stats.hit_ratio(),
            default_ttl_secs: self.default_ttl.as_secs(),
            min_ttl_secs: self.min_ttl.as_secs(),
            max_ttl_secs: self.max_ttl.as_secs(),
        }
    }

    // == Default TTL ==
    /// The TTL to apply when an origin response carries no usable
    /// freshness directive.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
