//! NDVI API Server
//!
//! Serves point values, time series, statistics and grids from the monthly
//! Tenggeli Desert NDVI composites.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use ndvi_api::config::ServiceConfig;
use ndvi_api::state::AppState;

/// NDVI API Server
#[derive(Parser, Debug)]
#[command(name = "ndvi-api")]
#[command(about = "HTTP JSON API for Tenggeli Desert NDVI composites")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "NDVI_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "NDVI_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Optional YAML configuration file
    #[arg(short, long, env = "NDVI_CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_server(args)) {
        error!("NDVI API server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    info!("Starting NDVI API server");

    let config = ServiceConfig::load(args.config.as_deref())?;
    let state = Arc::new(AppState::new(config, Some(prometheus_handle)));
    if !state.data_path_exists() {
        tracing::warn!(
            data_dir = %state.store.data_dir().display(),
            "Data directory does not exist; serving an empty index"
        );
    }

    let app = ndvi_api::app(state);

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("NDVI API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
