//! Month-over-month trend handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use raster_store::{TrendReport, DEFAULT_LOOKBACK_MONTHS};

use super::query::QueryParams;
use super::record_request;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /ndvi/trend?lat&lon&year&month[&lookback]
pub async fn trend_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TrendReport>, ApiError> {
    record_request("trend");
    let params = QueryParams::from(params);
    let period = params.period()?;
    let point = params.point()?;
    let lookback = params
        .optional("lookback")?
        .unwrap_or(DEFAULT_LOOKBACK_MONTHS);

    let report = state.store.trend(point, period, lookback).await?;
    Ok(Json(report))
}
