//! Atelier Sentinel - Idle Shutdown Monitor
//! Watches the art queue and stops this EC2 host once it has sat idle
//! past the threshold. Runs as its own process beside the daemon.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use atelier_core::application::{IdleMonitor, MonitorConfig};
use atelier_core::port::SystemClock;
use atelier_infra_aws::Ec2InstanceController;
use atelier_infra_redis::RedisQueueDepthSource;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: u16 = 6379;
const DEFAULT_QUEUE: &str = "art-generation-queue";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("ATELIER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("atelier=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Atelier sentinel v{} starting...", VERSION);

    // 2. Load configuration (queue endpoint from environment)
    let redis_host = std::env::var("REDIS_HOST").unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
    let redis_port: u16 = std::env::var("REDIS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REDIS_PORT);
    let queue_name = std::env::var("ATELIER_QUEUE").unwrap_or_else(|_| DEFAULT_QUEUE.to_string());

    info!(
        host = %redis_host,
        port = redis_port,
        queue = %queue_name,
        "Watching queue for idleness"
    );

    // 3. Setup dependencies (DI wiring)
    let depth_source = Arc::new(
        RedisQueueDepthSource::new(&redis_host, redis_port, &queue_name)
            .map_err(|e| anyhow::anyhow!("Queue client setup failed: {}", e))?,
    );
    let clock = Arc::new(SystemClock);
    let instances = Arc::new(Ec2InstanceController::new());

    // 4. Run the monitor to completion
    let monitor = IdleMonitor::new(clock, depth_source, instances, MonitorConfig::default());

    match monitor.run().await {
        Ok(()) => {
            info!("Idle threshold reached; instance stop underway.");
            Ok(())
        }
        Err(e) => {
            // One attempt only. A failed stop leaves the host running and
            // the operator a log line to act on.
            error!(error = %e, "Instance stop failed; host left running");
            std::process::exit(1);
        }
    }
}
