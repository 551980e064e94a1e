//! Grid sampling handler.
//!
//! Serves the map overlay in one request: every cell of a rows x cols grid
//! for one month, or for each indexed month of a year range.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use raster_store::{GridFrame, GridSpec, MAX_GRID_CELLS_PER_SIDE};
use serde::Serialize;

use super::query::QueryParams;
use super::record_request;
use crate::config::RegionBounds;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GridResponse {
    pub rows: usize,
    pub cols: usize,
    pub bbox: RegionBounds,
    pub frames: Vec<GridFrame>,
}

/// GET /ndvi/grid?(year&month | start_year&end_year)[&rows&cols&bbox]
pub async fn grid_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<GridResponse>, ApiError> {
    record_request("grid");
    let params = QueryParams::from(params);

    let rows = params.optional("rows")?.unwrap_or(MAX_GRID_CELLS_PER_SIDE);
    let cols = params.optional("cols")?.unwrap_or(MAX_GRID_CELLS_PER_SIDE);
    let bbox = params.bbox()?.unwrap_or_else(|| state.config.region.bbox());
    let grid = GridSpec::new(bbox, rows, cols)?;

    let periods = if params.contains("year") || params.contains("month") {
        vec![params.period()?]
    } else {
        let (start, end) = params.year_range(state.config.max_year_span)?;
        state.store.file_index().await?.periods_in_years(start, end)
    };

    let frames = state.store.sample_grid(grid, periods).await?;
    Ok(Json(GridResponse {
        rows,
        cols,
        bbox: bbox.into(),
        frames,
    }))
}
