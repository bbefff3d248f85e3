//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support
//! and revalidation metadata.

use bytes::Bytes;
use std::time::{Duration, Instant};

use super::ENTRY_OVERHEAD;

// == Cache Entry ==
/// Represents a single cache entry with payload and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored document bytes (cheaply cloneable).
    pub payload: Bytes,
    /// Absolute point in time after which the entry is stale.
    pub expires_at: Instant,
    /// Origin entity tag, sent back on conditional revalidation.
    pub etag: Option<String>,
    /// Origin modification timestamp, sent back on conditional revalidation.
    pub last_modified: Option<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `payload` - The document bytes to store
    /// * `ttl` - Time until the entry becomes stale (already clamped by the store)
    /// * `etag` - Optional origin entity tag
    /// * `last_modified` - Optional origin modification timestamp
    pub fn new(
        payload: Bytes,
        ttl: Duration,
        etag: Option<String>,
        last_modified: Option<String>,
    ) -> Self {
        Self {
            payload,
            expires_at: Instant::now() + ttl,
            etag,
            last_modified,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current instant has
    /// reached the expiry instant, so a zero remaining TTL means stale.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining time until expiry, zero if already expired.
    ///
    /// The revalidation path returns this to callers when the origin reports
    /// the content unchanged, so the client sees the entry's original cadence.
    pub fn remaining_ttl(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    // == Weight ==
    /// Approximate memory weight in bytes used for budget accounting.
    ///
    /// Payload length plus validator lengths plus a fixed per-entry overhead;
    /// exact heap usage is not tracked.
    pub fn weight(&self) -> usize {
        self.payload.len()
            + self.etag.as_ref().map_or(0, String::len)
            + self.last_modified.as_ref().map_or(0, String::len)
            + ENTRY_OVERHEAD
    }
}
