//! Configuration for the raster store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How integer bands are turned into NDVI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleEncoding {
    /// Multiplier for non-byte integer bands.
    pub integer_scale: f64,

    /// Offset added after scaling non-byte integer bands.
    pub integer_offset: f64,
}

impl Default for SampleEncoding {
    fn default() -> Self {
        Self {
            integer_scale: 0.0001,
            integer_offset: 0.0,
        }
    }
}

/// Configuration for [`crate::RasterStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the monthly composites.
    pub data_dir: PathBuf,

    /// Filename prefix of flat-layout composites (`<prefix>_<YYYY>_<MM>.tif`).
    pub file_prefix: String,

    /// Number of decoded rasters kept in memory. 0 disables caching.
    pub cache_capacity: usize,

    /// How long a directory scan stays valid, in seconds. 0 rescans on
    /// every request.
    pub index_ttl_secs: u64,

    /// Maximum rasters decoded at once when sampling grids.
    pub read_concurrency: usize,

    /// Integer band descaling.
    pub encoding: SampleEncoding,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/processed"),
            file_prefix: "tenggeli_ndvi".to_string(),
            cache_capacity: 24,
            index_ttl_secs: 60,
            read_concurrency: 8,
            encoding: SampleEncoding::default(),
        }
    }
}

impl StoreConfig {
    /// Config for a data directory with every other setting at its default.
    pub fn for_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("NDVI_DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("NDVI_FILE_PREFIX") {
            self.file_prefix = val;
        }

        if let Ok(val) = std::env::var("NDVI_CACHE_CAPACITY") {
            if let Ok(size) = val.parse() {
                self.cache_capacity = size;
            }
        }

        if let Ok(val) = std::env::var("NDVI_INDEX_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                self.index_ttl_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("NDVI_GRID_CONCURRENCY") {
            if let Ok(n) = val.parse() {
                self.read_concurrency = n;
            }
        }
    }

    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.file_prefix.is_empty() {
            return Err("file_prefix must not be empty".to_string());
        }
        if self.read_concurrency == 0 {
            return Err("read_concurrency must be at least 1".to_string());
        }
        if !self.encoding.integer_scale.is_finite() || self.encoding.integer_scale == 0.0 {
            return Err("encoding.integer_scale must be finite and non-zero".to_string());
        }
        Ok(())
    }
}
