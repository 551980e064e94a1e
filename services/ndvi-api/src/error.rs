//! JSON error responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use ndvi_common::NdviError;
use serde::Serialize;
use tracing::{error, warn};

/// Exception body returned for every failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionResponse {
    /// Exception type identifier.
    #[serde(rename = "type")]
    pub type_: String,

    /// Human-readable title.
    pub title: String,

    /// HTTP status code.
    pub status: u16,

    /// Detailed error message.
    pub detail: String,
}

impl ExceptionResponse {
    pub fn new(type_: impl Into<String>, status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

/// Handler error wrapping [`NdviError`].
#[derive(Debug)]
pub struct ApiError(pub NdviError);

impl From<NdviError> for ApiError {
    fn from(err: NdviError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        error_response(
            status,
            ExceptionResponse::new(self.0.exception_code(), status, self.0.to_string()),
        )
    }
}

/// Serialize an exception body with the given status.
pub fn error_response(status: StatusCode, exc: ExceptionResponse) -> Response {
    let json = serde_json::to_string(&exc).unwrap_or_default();
    (status, [(header::CONTENT_TYPE, "application/json")], json).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndvi_common::YearMonth;

    #[test]
    fn test_not_found_status() {
        let err = ApiError(NdviError::NotFound(YearMonth::new(2020, 7).unwrap()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_parameter_status() {
        let err = ApiError(NdviError::invalid("month", "Month must be between 1 and 12"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_exception_json() {
        let exc = ExceptionResponse::new("NotFound", StatusCode::NOT_FOUND, "No data found for 2020-07");
        let json = serde_json::to_value(&exc).unwrap();
        assert_eq!(json["type"], "NotFound");
        assert_eq!(json["title"], "Not Found");
        assert_eq!(json["status"], 404);
        assert_eq!(json["detail"], "No data found for 2020-07");
    }
}
