//! Landing page handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::config::RegionBounds;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Center {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct RegionInfo {
    #[serde(flatten)]
    pub bounds: RegionBounds,
    pub center: Center,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub data_path_exists: bool,
    pub region_bounds: RegionInfo,
}

/// GET / - Service description
pub async fn landing_handler(Extension(state): Extension<Arc<AppState>>) -> Json<LandingResponse> {
    let bounds = state.config.region;
    let (lng, lat) = bounds.bbox().center();

    Json(LandingResponse {
        message: "Tenggeli Desert NDVI API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        data_path_exists: state.data_path_exists(),
        region_bounds: RegionInfo {
            bounds,
            center: Center { lat, lng },
        },
    })
}
