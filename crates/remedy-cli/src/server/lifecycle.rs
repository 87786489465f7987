//! Startup and shutdown logging around the serve future.

use std::future::Future;
use std::io;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Runs `serve` and logs readiness, uptime and fatal errors.
pub async fn serve_with_shutdown<F>(
    config: &ServerConfig,
    serve: impl FnOnce() -> F,
) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Listening on all interfaces; the webhook and internal API rely on X-API-KEY only"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %config.server_addr(),
        "Accepting connections"
    );

    let started = Instant::now();
    let result = serve().await;
    let uptime_secs = started.elapsed().as_secs();

    if let Err(err) = &result {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            kind = ?err.kind(),
            uptime_secs,
            "HTTP server failed"
        );
    } else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs,
            "HTTP server drained"
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let config = ServerConfig::default();
        assert!(serve_with_shutdown(&config, || async { Ok(()) }).await.is_ok());
    }

    #[tokio::test]
    async fn passes_through_failure() {
        let config = ServerConfig::default();
        let result = serve_with_shutdown(&config, || async {
            Err(io::Error::new(io::ErrorKind::AddrInUse, "port taken"))
        })
        .await;

        assert_eq!(result.map_err(|e| e.kind()), Err(io::ErrorKind::AddrInUse));
    }
}
