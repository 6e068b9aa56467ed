//! Proxy server setup and initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{any, post},
    Router,
};
use tokio::net::TcpListener;

use super::handlers::{proxy_handler, reload_handler};
use super::state::{LiveConfig, ProxyState};

/// Build the outbound HTTP client
///
/// No client-wide timeout: streaming and buffered calls each set their own.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        // Force HTTP/1.1 to avoid HTTP/2 connection reset issues with some providers
        .http1_only()
        .build()
        .context("Failed to create HTTP client")
}

/// Routes: `POST /reload`, everything else is relayed
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/reload", post(reload_handler))
        .route("/", any(proxy_handler))
        .route("/*path", any(proxy_handler))
        .with_state(state)
}

/// Start the proxy server
pub async fn start_proxy(
    bind_addr: SocketAddr,
    live: Arc<LiveConfig>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    let state = ProxyState::new(build_client()?, live);
    let app = router(state);

    tracing::info!("Starting proxy on {}", bind_addr);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Proxy listening on {}", bind_addr);

    // Stop accepting on shutdown; in-flight requests (including open streams) finish
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Proxy server shut down gracefully");
    Ok(())
}
