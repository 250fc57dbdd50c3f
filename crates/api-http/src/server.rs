//! HTTP Server
//!
//! Binds the listener and serves the router with graceful shutdown.

use crate::routes::{build_router, AppState};
use atelier_core::error::Result;
use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

const DEFAULT_HTTP_PORT: u16 = 8000;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub addr: SocketAddr,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_HTTP_PORT)),
        }
    }
}

/// Bind and serve until `shutdown` resolves.
///
/// Callers wire readiness before this point: the listener must not exist
/// while model weights are still loading, so that the health probe only
/// answers once the service can actually generate.
pub async fn serve(
    config: HttpServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    info!(addr = %config.addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_all_interfaces() {
        let config = HttpServerConfig::default();
        assert_eq!(config.addr.port(), 8000);
        assert!(config.addr.ip().is_unspecified());
    }
}
