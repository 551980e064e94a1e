//! Application state for the NDVI API.

use metrics_exporter_prometheus::PrometheusHandle;
use raster_store::RasterStore;
use tracing::info;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Read-only access to the monthly composites.
    pub store: RasterStore,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Prometheus recorder handle, when one is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServiceConfig, prometheus: Option<PrometheusHandle>) -> Self {
        info!(
            data_dir = %config.store.data_dir.display(),
            cache_capacity = config.store.cache_capacity,
            index_ttl_secs = config.store.index_ttl_secs,
            "Initializing raster store"
        );
        let store = RasterStore::new(config.store.clone());
        Self {
            store,
            config,
            prometheus,
        }
    }

    /// Whether the data directory exists.
    pub fn data_path_exists(&self) -> bool {
        self.store.data_dir().is_dir()
    }
}
