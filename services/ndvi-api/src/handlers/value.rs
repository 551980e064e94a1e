//! Point value handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Serialize;
use tracing::debug;

use super::query::QueryParams;
use super::record_request;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ValueResponse {
    pub year: i32,
    pub month: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub ndvi_value: Option<f64>,
}

/// GET /ndvi/value?lat&lon&year&month
pub async fn value_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ValueResponse>, ApiError> {
    record_request("value");
    let params = QueryParams::from(params);
    // Validate everything before touching the file system.
    let period = params.period()?;
    let point = params.point()?;

    let ndvi_value = state.store.value(point, period).await?;
    debug!(period = %period, value = ?ndvi_value, "Resolved NDVI value");

    Ok(Json(ValueResponse {
        year: period.year,
        month: period.month,
        latitude: point.latitude,
        longitude: point.longitude,
        ndvi_value,
    }))
}
