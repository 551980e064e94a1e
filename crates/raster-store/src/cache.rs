//! In-memory LRU cache for decoded composites.
//!
//! Keys are composite file paths. Entries are evicted least-recently-used
//! first once `capacity` rasters are held; a capacity of 0 disables the
//! cache entirely.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::geotiff::RasterComposite;

/// Snapshot of cache statistics.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct RasterCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Rasters decoded from disk.
    pub loads: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl RasterCacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Bounded LRU of decoded rasters shared across requests.
pub struct RasterCache {
    cache: Option<RwLock<LruCache<PathBuf, Arc<RasterComposite>>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    loads: AtomicU64,
}

impl RasterCache {
    /// Create a cache holding at most `capacity` rasters.
    ///
    /// Memory is roughly `capacity * width * height * sample size`; a
    /// 2200 x 1500 float32 composite is about 13 MB.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|cap| RwLock::new(LruCache::new(cap))),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }

    /// Look up a raster, marking it most recently used.
    pub async fn get(&self, path: &Path) -> Option<Arc<RasterComposite>> {
        let found = match &self.cache {
            Some(cache) => cache.write().await.get(path).cloned(),
            None => None,
        };

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("ndvi_raster_cache_hits_total").increment(1);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("ndvi_raster_cache_misses_total").increment(1);
        }
        found
    }

    /// Look up a raster without touching LRU order or hit/miss counters.
    pub async fn peek(&self, path: &Path) -> Option<Arc<RasterComposite>> {
        match &self.cache {
            Some(cache) => cache.read().await.peek(path).cloned(),
            None => None,
        }
    }

    /// Count one raster decoded from disk.
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Insert a raster, evicting the least recently used one when full.
    pub async fn insert(&self, raster: Arc<RasterComposite>) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = raster.path().to_path_buf();
        let mut cache = cache.write().await;
        if let Some((evicted, _)) = cache.push(key.clone(), raster) {
            if evicted != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(path = %evicted.display(), "Evicted raster from cache");
            }
        }
    }

    /// Get current cache statistics.
    pub async fn stats(&self) -> RasterCacheStats {
        let entries = match &self.cache {
            Some(cache) => cache.read().await.len(),
            None => 0,
        };
        RasterCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            entries,
            capacity: self.capacity,
        }
    }

    /// Clear the cache.
    pub async fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.write().await.clear();
        }
    }
}
