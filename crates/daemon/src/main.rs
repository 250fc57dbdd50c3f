//! Atelier - Main Entry Point
//! Edge-conditioned generation service: readiness-gated HTTP surface over
//! the diffusion inference runtime.

mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use atelier_api_http::{serve, AppState, HttpServerConfig};
use atelier_core::application::ArtService;
use atelier_core::domain::InferenceSettings;
use atelier_infra_runtime::HttpPipeline;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_RUNTIME_URL: &str = "http://127.0.0.1:7860";
// Cold starts pull gigabytes of weights from disk; give the runtime time.
const DEFAULT_READY_TIMEOUT_SECS: u64 = 900;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("ATELIER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("atelier=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Atelier v{} starting...", VERSION);

    // 1.1. Initialize OpenTelemetry (optional)
    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration
    let http_addr = std::env::var("ATELIER_HTTP_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| HttpServerConfig::default().addr);

    let runtime_url =
        std::env::var("ATELIER_RUNTIME_URL").unwrap_or_else(|_| DEFAULT_RUNTIME_URL.to_string());

    let request_timeout_secs: u64 = std::env::var("ATELIER_RUNTIME_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    let ready_timeout_secs: u64 = std::env::var("ATELIER_READY_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_READY_TIMEOUT_SECS);

    // 3. Connect the pipeline and wait for model load
    info!(runtime_url = %runtime_url, "Connecting to inference runtime...");
    let pipeline = Arc::new(
        HttpPipeline::with_timeout(&runtime_url, Duration::from_secs(request_timeout_secs))
            .map_err(|e| anyhow::anyhow!("Pipeline setup failed: {}", e))?,
    );

    info!("Waiting for model load...");
    pipeline
        .wait_until_ready(Duration::from_secs(ready_timeout_secs))
        .await
        .map_err(|e| anyhow::anyhow!("Inference runtime never became ready: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let art = Arc::new(ArtService::new(pipeline, InferenceSettings::default()));
    let state = AppState::new(art);
    let config = HttpServerConfig { addr: http_addr };

    info!(addr = %http_addr, "✅ Model loaded. Serving traffic...");
    info!("Press Ctrl+C to shutdown");

    // 5. Serve until the shutdown signal arrives
    serve(config, state, shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))?;

    info!("Shutdown complete.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received. Exiting gracefully...");
}
