//! Cache Module
//!
//! Provides the bounded in-memory store with TTL clamping, LRU eviction,
//! and memory accounting, plus cache key fingerprinting.

mod entry;
mod keys;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use keys::fingerprint;
pub use lru::LruTracker;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;

// == Public Constants ==
/// Fixed weight in bytes charged to every entry on top of its payload and
/// validators, covering map and recency-list bookkeeping. Sizing is
/// approximate; the constant keeps empty payloads from weighing zero.
pub const ENTRY_OVERHEAD: usize = 64;
