use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::models::DailySummary;

/// One cached digest with the content fingerprint it was computed from.
#[derive(Debug, Clone)]
pub struct CachedDigest {
    pub fingerprint: String,
    pub data: DailySummary,
}

/// Thread-safe LRU cache of daily digests, keyed by calendar date label.
///
/// The LRU bound only matters across date rollovers — one entry per date —
/// so a small capacity keeps weeks of digests warm.
#[derive(Clone)]
pub struct SummaryCache {
    cache: Arc<Mutex<LruCache<String, CachedDigest>>>,
}

impl SummaryCache {
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        let cache = LruCache::new(NonZeroUsize::new(capacity).expect("Capacity must be non-zero"));
        Self {
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn get(&self, date_label: &str) -> Option<CachedDigest> {
        let mut cache = self.cache.lock().unwrap();
        cache.get(date_label).cloned()
    }

    pub fn put(&self, date_label: String, digest: CachedDigest) {
        let mut cache = self.cache.lock().unwrap();
        cache.put(date_label, digest);
    }
}
