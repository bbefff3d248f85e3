//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction, backed by
//! the `lru` crate's hash map plus doubly linked recency list so touch,
//! remove, and evict are all O(1).

use lru::LruCache;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Only key order matters here; entry storage and capacity enforcement
/// live in the store. Ties in recency are broken by list order, so the
/// eviction sequence is deterministic.
pub struct LruTracker {
    /// Recency-ordered keys, values unused.
    order: LruCache<String, ()>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: LruCache::unbounded(),
        }
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        // get() promotes an existing key without reallocating it.
        if self.order.get(key).is_none() {
            self.order.put(key.to_string(), ());
        }
    }

    // == Remove ==
    /// Removes a key from the tracker. No-op if absent.
    pub fn remove(&mut self, key: &str) {
        self.order.pop(key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_lru().map(|(key, ())| key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.peek_lru().map(|(key, ())| key)
    }

    // == Clear ==
    /// Removes all tracked keys.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.contains(key)
    }
}

impl Default for LruTracker {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let lru = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_touch_new_key() {
        let mut lru = LruTracker::new();

        lru.touch("key1");
        lru.touch("key2");
        lru.touch("key3");

        assert_eq!(lru.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(lru.peek_oldest(), Some(&"key1".to_string()));
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        lru.touch("key1");
        lru.touch("key2");
        lru.touch("key3");

        // Touch key1 again - should become most recent
        lru.touch("key1");

        assert_eq!(lru.len(), 3);
        // key2 is now oldest
        assert_eq!(lru.peek_oldest(), Some(&"key2".to_string()));
    }

    #[test]
    fn test_lru_evict_oldest() {
        let mut lru = LruTracker::new();

        lru.touch("key1");
        lru.touch("key2");
        lru.touch("key3");

        let evicted = lru.evict_oldest();
        assert_eq!(evicted, Some("key1".to_string()));
        assert_eq!(lru.len(), 2);

        let evicted = lru.evict_oldest();
        assert_eq!(evicted, Some("key2".to_string()));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_evict_empty() {
        let mut lru = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove() {
        let mut lru = LruTracker::new();

        lru.touch("key1");
        lru.touch("key2");
        lru.touch("key3");

        lru.remove("key2");

        assert_eq!(lru.len(), 2);
        assert!(!lru.contains("key2"));
        assert!(lru.contains("key1"));
        assert!(lru.contains("key3"));
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruTracker::new();

        lru.touch("a");
        lru.touch("b");
        lru.touch("c");

        // Re-access in a different order; eviction must follow access
        // order, oldest first: a, then c, then b.
        lru.touch("a");
        lru.touch("c");
        lru.touch("b");

        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
    }

    #[test]
    fn test_lru_remove_nonexistent_key() {
        let mut lru = LruTracker::new();

        lru.touch("key1");
        lru.touch("key2");

        // Remove a key that doesn't exist - should not panic or affect existing keys
        lru.remove("nonexistent");

        assert_eq!(lru.len(), 2);
        assert!(lru.contains("key1"));
        assert!(lru.contains("key2"));
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = LruTracker::new();

        lru.touch("key1");
        lru.touch("key1");
        lru.touch("key1");

        // Should only have one entry
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.evict_oldest(), Some("key1".to_string()));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = LruTracker::new();

        lru.touch("a");
        lru.touch("b");
        lru.touch("c");

        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_evict_oldest_returns_correct_key() {
        let mut lru = LruTracker::new();

        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("d");

        // Oldest should be 'a' (first added, never touched again)
        assert_eq!(lru.peek_oldest(), Some(&"a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("a".to_string()));

        // Now oldest should be 'b'
        assert_eq!(lru.peek_oldest(), Some(&"b".to_string()));
    }

    #[test]
    fn test_lru_touch_moves_to_front() {
        let mut lru = LruTracker::new();

        lru.touch("a");
        lru.touch("b");
        lru.touch("c");

        // 'a' is oldest
        assert_eq!(lru.peek_oldest(), Some(&"a".to_string()));

        // Touch 'a' to refresh it
        lru.touch("a");

        // Now 'b' should be oldest
        assert_eq!(lru.peek_oldest(), Some(&"b".to_string()));

        // Verify 'a' is evicted last
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
    }
}
