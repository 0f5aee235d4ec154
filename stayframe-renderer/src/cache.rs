//! Decoded asset cache for one renderer instance.
//!
//! Keyed by the asset URL exactly as written in the template. Failed loads
//! are remembered so a broken URL is attempted once per renderer.

use std::collections::HashMap;
use std::sync::Arc;

use tiny_skia::Pixmap;

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a decoded image.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Assets that failed to load.
    pub failures: u64,
    /// Total decoded bytes inserted.
    pub bytes_loaded: u64,
}

/// Decoded images by URL.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<String, Arc<Pixmap>>,
    failed: HashMap<String, String>,
    size_bytes: usize,
    stats: CacheStats,
}

impl AssetCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a decoded image, recording a hit or miss.
    pub fn get(&mut self, key: &str) -> Option<Arc<Pixmap>> {
        if let Some(image) = self.entries.get(key) {
            self.stats.hits += 1;
            Some(Arc::clone(image))
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Insert a decoded image, replacing any previous entry or failure.
    pub fn insert(&mut self, key: String, image: Pixmap) {
        let size = image.data().len();
        self.failed.remove(&key);
        if let Some(old) = self.entries.insert(key, Arc::new(image)) {
            self.size_bytes -= old.data().len();
        }
        self.size_bytes += size;
        self.stats.bytes_loaded += size as u64;
    }

    /// Remember that `key` failed to load.
    pub fn mark_failed(&mut self, key: String, reason: String) {
        self.stats.failures += 1;
        self.failed.insert(key, reason);
    }

    /// Why `key` failed, if it did.
    #[must_use]
    pub fn failure(&self, key: &str) -> Option<&str> {
        self.failed.get(key).map(String::as_str)
    }

    /// Whether `key` has been attempted, successfully or not.
    #[must_use]
    pub fn is_settled(&self, key: &str) -> bool {
        self.entries.contains_key(key) || self.failed.contains_key(key)
    }

    /// Whether a decoded image is cached for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of decoded images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no images are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decoded bytes held.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Statistics so far.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry and failure record. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.failed.clear();
        self.size_bytes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: u32, h: u32) -> Pixmap {
        Pixmap::new(w, h).unwrap()
    }

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = AssetCache::new();
        cache.insert("a.png".into(), image(2, 2));
        assert!(cache.contains("a.png"));
        assert_eq!(cache.get("a.png").unwrap().width(), 2);
        assert!(cache.get("b.png").is_none());
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert_eq!(cache.size_bytes(), 16);
    }

    #[test]
    fn test_replacing_entry_updates_size() {
        let mut cache = AssetCache::new();
        cache.insert("a.png".into(), image(2, 2));
        cache.insert("a.png".into(), image(1, 1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size_bytes(), 4);
    }

    #[test]
    fn test_failures_are_settled() {
        let mut cache = AssetCache::new();
        cache.mark_failed("broken.png".into(), "404".into());
        assert!(cache.is_settled("broken.png"));
        assert!(!cache.contains("broken.png"));
        assert_eq!(cache.failure("broken.png"), Some("404"));
        assert_eq!(cache.stats().failures, 1);

        cache.clear();
        assert!(!cache.is_settled("broken.png"));
        assert_eq!(cache.stats().failures, 1);
    }
}
