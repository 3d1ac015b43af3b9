use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::{Error, Result};

/// Bind the HTTP listener on `address` (`host:port`).
pub async fn bind_listener(address: &str) -> Result<TcpListener> {
    TcpListener::bind(address)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind API server on {}: {}", address, e)))
}

/// Serve `router` until `shutdown` is cancelled, then let in-flight requests
/// finish before returning.
pub async fn serve(listener: TcpListener, router: Router, shutdown: CancellationToken) -> Result<()> {
    let address = listener
        .local_addr()
        .map_err(|e| Error::transport(format!("Failed to read listener address: {}", e)))?;
    info!(address = %address, "Starting HTTP API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::transport(format!("API server error: {}", e)))?;

    info!("API server shutdown completed");
    Ok(())
}
