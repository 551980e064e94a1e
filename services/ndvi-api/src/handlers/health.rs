//! Health and metrics handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct DataDirectories {
    pub processed_data_path: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub data_directories: DataDirectories,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub data_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composites: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health - Liveness check
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ndvi",
        data_directories: DataDirectories {
            processed_data_path: state.data_path_exists(),
        },
    })
}

/// GET /ready - Readiness check (data directory present and scannable)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let data_dir = state.store.data_dir().display().to_string();

    let response = if !state.data_path_exists() {
        ReadyResponse {
            ready: false,
            data_dir,
            composites: None,
            error: Some("data directory does not exist".to_string()),
        }
    } else {
        match state.store.file_index().await {
            Ok(index) => ReadyResponse {
                ready: true,
                data_dir,
                composites: Some(index.len()),
                error: None,
            },
            Err(e) => ReadyResponse {
                ready: false,
                data_dir,
                composites: None,
                error: Some(e.to_string()),
            },
        }
    };

    let status = if response.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response)).into_response()
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut output = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let stats = state.store.cache_stats().await;
    let _ = write!(
        output,
        "# HELP ndvi_raster_cache_entries Decoded rasters held in memory\n\
         # TYPE ndvi_raster_cache_entries gauge\n\
         ndvi_raster_cache_entries {}\n\
         # HELP ndvi_raster_cache_capacity Raster cache capacity\n\
         # TYPE ndvi_raster_cache_capacity gauge\n\
         ndvi_raster_cache_capacity {}\n\
         # HELP ndvi_raster_cache_evictions Rasters evicted from the cache\n\
         # TYPE ndvi_raster_cache_evictions counter\n\
         ndvi_raster_cache_evictions {}\n\
         # HELP ndvi_raster_cache_hit_rate Raster cache hit rate (percent)\n\
         # TYPE ndvi_raster_cache_hit_rate gauge\n\
         ndvi_raster_cache_hit_rate {:.2}\n",
        stats.entries,
        stats.capacity,
        stats.evictions,
        stats.hit_rate()
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        output,
    )
        .into_response()
}
