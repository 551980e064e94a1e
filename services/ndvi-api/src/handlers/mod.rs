//! HTTP request handlers for the NDVI API.

pub mod coverage;
pub mod files;
pub mod grid;
pub mod health;
pub mod landing;
pub mod query;
pub mod statistics;
pub mod timeseries;
pub mod trend;
pub mod value;

/// Count a request against `endpoint`.
pub(crate) fn record_request(endpoint: &'static str) {
    metrics::counter!("ndvi_requests_total", "endpoint" => endpoint).increment(1);
}
