//! Read-only access to the composite directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ndvi_common::{NdviError, NdviResult, YearMonth};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error};

use crate::cache::{RasterCache, RasterCacheStats};
use crate::config::StoreConfig;
use crate::geotiff::RasterComposite;
use crate::index::FileIndex;

/// Entry point for all raster queries.
///
/// Holds the cached directory index and the decoded-raster LRU. Every
/// query is read-only; the store can be shared across request tasks.
pub struct RasterStore {
    config: StoreConfig,
    cache: RasterCache,
    index: RwLock<Option<(Instant, Arc<FileIndex>)>>,
    /// One gate per path being decoded; concurrent misses wait on it.
    loading: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl RasterStore {
    pub fn new(config: StoreConfig) -> Self {
        let cache = RasterCache::new(config.cache_capacity);
        Self {
            config,
            cache,
            index: RwLock::new(None),
            loading: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// The current file index, rescanning the directory once the cached
    /// scan is older than `index_ttl_secs`.
    pub async fn file_index(&self) -> NdviResult<Arc<FileIndex>> {
        let ttl = self.config.index_ttl();
        if !ttl.is_zero() {
            let guard = self.index.read().await;
            if let Some((scanned_at, index)) = guard.as_ref() {
                if scanned_at.elapsed() < ttl {
                    return Ok(Arc::clone(index));
                }
            }
        }

        let dir = self.config.data_dir.clone();
        let prefix = self.config.file_prefix.clone();
        let index = tokio::task::spawn_blocking(move || FileIndex::scan(&dir, &prefix))
            .await
            .map_err(|e| NdviError::Internal(format!("index task failed: {}", e)))??;
        let index = Arc::new(index);

        if !ttl.is_zero() {
            *self.index.write().await = Some((Instant::now(), Arc::clone(&index)));
        }
        Ok(index)
    }

    /// Drop the cached index and decoded rasters so the next query
    /// rescans the directory.
    pub async fn invalidate_index(&self) {
        *self.index.write().await = None;
        self.cache.clear().await;
    }

    /// Decoded composite for `period`.
    ///
    /// Fails with `NotFound` when the period has no file, including a file
    /// that disappeared after the index was built.
    pub async fn open(&self, period: YearMonth) -> NdviResult<Arc<RasterComposite>> {
        let index = self.file_index().await?;
        self.open_indexed(&index, period).await
    }

    /// Like [`open`](Self::open) against an index the caller already holds.
    pub async fn open_indexed(
        &self,
        index: &FileIndex,
        period: YearMonth,
    ) -> NdviResult<Arc<RasterComposite>> {
        let path = index
            .get(&period)
            .ok_or(NdviError::NotFound(period))?
            .to_path_buf();

        if let Some(raster) = self.cache.get(&path).await {
            return Ok(raster);
        }

        let gate = {
            let mut loading = self.loading.lock().await;
            Arc::clone(loading.entry(path.clone()).or_default())
        };
        let result = {
            let _flight = gate.lock().await;
            match self.cache.peek(&path).await {
                Some(raster) => Ok(raster),
                None => self.load(&path, period).await,
            }
        };

        let mut loading = self.loading.lock().await;
        // The map and this task hold the only references.
        if Arc::strong_count(&gate) == 2 {
            loading.remove(&path);
        }
        result
    }

    async fn load(&self, path: &Path, period: YearMonth) -> NdviResult<Arc<RasterComposite>> {
        let start = Instant::now();
        let encoding = self.config.encoding;
        let load_path = path.to_path_buf();
        let result =
            tokio::task::spawn_blocking(move || RasterComposite::open(&load_path, encoding))
                .await
                .map_err(|e| NdviError::Internal(format!("raster task failed: {}", e)))?;

        let raster = match result {
            Ok(raster) => Arc::new(raster),
            Err(NdviError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Indexed composite vanished");
                return Err(NdviError::NotFound(period));
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load composite");
                return Err(e);
            }
        };
        self.cache.record_load();

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("ndvi_raster_load_duration_ms").record(elapsed_ms);
        debug!(
            period = %period,
            path = %path.display(),
            width = raster.width(),
            height = raster.height(),
            dtype = raster.samples().dtype(),
            crs = %raster.crs(),
            nodata = ?raster.nodata(),
            elapsed_ms = elapsed_ms,
            "Loaded composite"
        );

        self.cache.insert(Arc::clone(&raster)).await;
        Ok(raster)
    }

    pub async fn cache_stats(&self) -> RasterCacheStats {
        self.cache.stats().await
    }
}
