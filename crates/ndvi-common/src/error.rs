//! Error types for the NDVI services.

use thiserror::Error;

use crate::period::YearMonth;

/// Result type alias using NdviError.
pub type NdviResult<T> = Result<T, NdviError>;

/// Primary error type for NDVI raster queries.
///
/// A point that falls outside a raster or onto a nodata pixel is not an
/// error; resolvers return `Ok(None)` for that case.
#[derive(Debug, Error)]
pub enum NdviError {
    // === Malformed input ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data errors ===
    #[error("No data found for {0}")]
    NotFound(YearMonth),

    #[error("Failed to read raster {path}: {message}")]
    RasterRead { path: String, message: String },

    #[error("Unsupported raster {path}: {message}")]
    UnsupportedRaster { path: String, message: String },

    // === Infrastructure ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl NdviError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        NdviError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a `RasterRead` error.
    pub fn raster_read(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        NdviError::RasterRead {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Shorthand for an `UnsupportedRaster` error.
    pub fn unsupported(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        NdviError::UnsupportedRaster {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this is the "no raster for that month" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, NdviError::NotFound(_))
    }

    /// Short machine-readable exception code.
    pub fn exception_code(&self) -> &'static str {
        match self {
            NdviError::MissingParameter(_) => "MissingParameterValue",
            NdviError::InvalidParameter { .. } => "InvalidParameterValue",
            NdviError::NotFound(_) => "NotFound",
            NdviError::RasterRead { .. } | NdviError::UnsupportedRaster { .. } => "RasterError",
            _ => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            NdviError::MissingParameter(_) | NdviError::InvalidParameter { .. } => 400,

            NdviError::NotFound(_) => 404,

            _ => 500,
        }
    }
}
