//! Time series handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use raster_store::TimeSeries;

use super::query::QueryParams;
use super::record_request;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /ndvi/timeseries?lat&lon[&start_year&end_year]
pub async fn timeseries_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TimeSeries>, ApiError> {
    record_request("timeseries");
    let params = QueryParams::from(params);
    let point = params.point()?;
    let (start_year, end_year) = params.year_range(state.config.max_year_span)?;

    let series = state.store.time_series(point, start_year, end_year).await?;
    Ok(Json(series))
}
