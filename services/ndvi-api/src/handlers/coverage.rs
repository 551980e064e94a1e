//! Dataset validation handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use raster_store::ValidationReport;

use super::query::QueryParams;
use super::record_request;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /ndvi/coverage[?start_year&end_year]
///
/// Without a year range every indexed composite is checked.
pub async fn coverage_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ValidationReport>, ApiError> {
    record_request("coverage");
    let params = QueryParams::from(params);

    let years = if params.contains("start_year") || params.contains("end_year") {
        Some(params.year_range(state.config.max_year_span)?)
    } else {
        None
    };

    Ok(Json(state.store.validate(years).await?))
}
