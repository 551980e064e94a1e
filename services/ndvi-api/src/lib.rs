//! NDVI API Service Library
//!
//! HTTP JSON facade over the monthly NDVI composites of the Tenggeli Desert.
//! Every `/ndvi/*` route is served both at the root and under `/api/v1`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Extension, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::state::AppState;

/// Routes for the NDVI queries.
fn ndvi_routes() -> Router {
    Router::new()
        .route("/ndvi/value", get(handlers::value::value_handler))
        .route(
            "/ndvi/timeseries",
            get(handlers::timeseries::timeseries_handler),
        )
        .route(
            "/ndvi/statistics",
            get(handlers::statistics::statistics_handler),
        )
        .route("/ndvi/files", get(handlers::files::files_handler))
        .route("/ndvi/trend", get(handlers::trend::trend_handler))
        .route("/ndvi/grid", get(handlers::grid::grid_handler))
        .route(
            "/ndvi/coverage",
            get(handlers::coverage::coverage_handler),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        // Landing page
        .route("/", get(handlers::landing::landing_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/api/v1/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // NDVI queries
        .merge(ndvi_routes())
        .nest("/api/v1", ndvi_routes())
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_lists() {
        let _ = cors_layer(&[]);
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
    }
}
