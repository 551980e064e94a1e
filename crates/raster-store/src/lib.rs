//! Read-only access to monthly NDVI GeoTIFF composites.
//!
//! # Architecture
//!
//! ```text
//! query (point, year, month)
//!      │
//!      ▼
//! RasterStore::file_index()      directory scan, cached for index_ttl_secs
//!      │
//!      ├─► period not indexed ──► NdviError::NotFound
//!      │
//!      ▼
//! RasterCache (LRU by path) ──miss──► RasterComposite::open (spawn_blocking)
//!      │
//!      ▼
//! inverse geotransform ──► pixel ──► NDVI | None (outside / nodata)
//! ```
//!
//! Time series, statistics, trend, grid sampling and dataset validation
//! are all built on the same `open` path, so a decoded composite is shared
//! by every query that touches its month. Concurrent misses on one path
//! share a single decode.

pub mod cache;
pub mod config;
pub mod geotiff;
pub mod index;
pub mod resolver;
pub mod sampler;
pub mod series;
pub mod statistics;
pub mod store;
pub mod transform;
pub mod trend;
pub mod validation;

pub use cache::{RasterCache, RasterCacheStats};
pub use config::{SampleEncoding, StoreConfig};
pub use geotiff::{BandSamples, PixelClass, RasterComposite};
pub use index::FileIndex;
pub use resolver::NdviSample;
pub use sampler::{GridCell, GridFrame, GridSpec, MAX_GRID_CELLS_PER_SIDE};
pub use series::{SeriesStatistics, TimeSeries};
pub use statistics::RasterStatistics;
pub use store::RasterStore;
pub use transform::GeoTransform;
pub use trend::{
    PreviousValue, TrendDirection, TrendReport, DEFAULT_LOOKBACK_MONTHS, MAX_LOOKBACK_MONTHS,
};
pub use validation::{
    FileDetails, FileReport, FileStatus, PixelCensus, ValidationReport, YearCoverage,
};
