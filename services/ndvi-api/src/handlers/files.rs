//! Available composites handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use ndvi_common::YearMonth;
use serde::Serialize;

use super::record_request;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<YearMonth>,
    pub count: usize,
}

/// GET /ndvi/files
pub async fn files_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<FilesResponse>, ApiError> {
    record_request("files");
    let index = state.store.file_index().await?;
    let files: Vec<YearMonth> = index.periods().collect();
    Ok(Json(FilesResponse {
        count: files.len(),
        files,
    }))
}
