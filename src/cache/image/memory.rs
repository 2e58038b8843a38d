use image::DynamicImage;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::trace;

/// Bounded in-memory tier of decoded images, least-recently-used eviction
///
/// Both reads and inserts count as a use.
#[derive(Debug)]
pub struct MemoryTier {
    entries: Mutex<LruCache<String, Arc<DynamicImage>>>,
}

impl MemoryTier {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up `key`, marking it most recently used
    pub fn get(&self, key: &str) -> Option<Arc<DynamicImage>> {
        self.entries.lock().get(key).cloned()
    }

    /// Insert `image`; returns the key evicted to make room, if any
    pub fn put(&self, key: String, image: Arc<DynamicImage>) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.push(key.clone(), image) {
            Some((evicted, _)) if evicted != key => {
                trace!(key = %evicted, "Evicted least recently used image");
                Some(evicted)
            }
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> Arc<DynamicImage> {
        Arc::new(DynamicImage::new_rgb8(1, 1))
    }

    #[test]
    fn test_51st_insert_evicts_least_recently_used() {
        let tier = MemoryTier::new(50);
        for i in 0..50 {
            assert_eq!(tier.put(format!("k{}", i), pixel()), None);
        }
        assert_eq!(tier.len(), 50);

        let evicted = tier.put("k50".to_string(), pixel());
        assert_eq!(evicted, Some("k0".to_string()));
        assert_eq!(tier.len(), 50);
        assert!(!tier.contains("k0"));
        assert!(tier.contains("k1"));
    }

    #[test]
    fn test_read_protects_entry_from_eviction() {
        let tier = MemoryTier::new(50);
        for i in 0..50 {
            tier.put(format!("k{}", i), pixel());
        }

        assert!(tier.get("k0").is_some());
        let evicted = tier.put("k50".to_string(), pixel());

        assert_eq!(evicted, Some("k1".to_string()));
        assert!(tier.contains("k0"));
    }

    #[test]
    fn test_reinsert_counts_as_use_and_does_not_evict() {
        let tier = MemoryTier::new(2);
        tier.put("a".into(), pixel());
        tier.put("b".into(), pixel());
        assert_eq!(tier.put("a".into(), pixel()), None);

        assert_eq!(tier.put("c".into(), pixel()), Some("b".to_string()));
        assert!(tier.contains("a"));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let tier = MemoryTier::new(0);
        assert_eq!(tier.capacity(), 1);
        tier.put("a".into(), pixel());
        tier.clear();
        assert!(tier.is_empty());
    }
}
