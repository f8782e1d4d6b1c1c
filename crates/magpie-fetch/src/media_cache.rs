//! Process-lifetime cache of resolved media URLs.
//!
//! Keyed by `(post_id, quality)`. Capacity-bounded LRU rather than an
//! unbounded map, so a long-lived process cannot grow it without limit.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use magpie_core::defaults::MEDIA_URL_CACHE_CAPACITY;

/// Bounded cache of resolved media URLs.
pub struct MediaUrlCache {
    inner: Mutex<LruCache<(String, String), String>>,
}

impl MediaUrlCache {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Create a cache with the default capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(MEDIA_URL_CACHE_CAPACITY)
    }

    /// Look up a resolved URL, refreshing its recency.
    pub fn get(&self, post_id: &str, quality: &str) -> Option<String> {
        let mut cache = self.inner.lock().unwrap();
        cache
            .get(&(post_id.to_string(), quality.to_string()))
            .cloned()
    }

    /// Store a resolved URL, evicting the least recently used entry at
    /// capacity.
    pub fn insert(&self, post_id: &str, quality: &str, url: &str) {
        let mut cache = self.inner.lock().unwrap();
        cache.put(
            (post_id.to_string(), quality.to_string()),
            url.to_string(),
        );
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = MediaUrlCache::new(8);
        cache.insert("1", "orig", "https://vid/1.mp4");
        assert_eq!(cache.get("1", "orig").as_deref(), Some("https://vid/1.mp4"));
        assert!(cache.get("1", "preview").is_none());
        assert!(cache.get("2", "orig").is_none());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = MediaUrlCache::new(2);
        cache.insert("1", "orig", "a");
        cache.insert("2", "orig", "b");
        // Touch "1" so "2" is the eviction candidate.
        cache.get("1", "orig");
        cache.insert("3", "orig", "c");

        assert_eq!(cache.len(), 2);
        assert!(cache.get("1", "orig").is_some());
        assert!(cache.get("2", "orig").is_none());
        assert!(cache.get("3", "orig").is_some());
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let cache = MediaUrlCache::new(0);
        cache.insert("1", "orig", "a");
        assert_eq!(cache.len(), 1);
    }
}
