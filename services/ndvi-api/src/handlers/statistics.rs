//! Whole-raster statistics handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use raster_store::RasterStatistics;
use serde::Serialize;

use super::query::QueryParams;
use super::record_request;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub year: i32,
    pub month: u32,
    pub statistics: RasterStatistics,
}

/// GET /ndvi/statistics?year&month
pub async fn statistics_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    record_request("statistics");
    let period = QueryParams::from(params).period()?;

    let statistics = state.store.statistics(period).await?;
    Ok(Json(StatisticsResponse {
        year: period.year,
        month: period.month,
        statistics,
    }))
}
