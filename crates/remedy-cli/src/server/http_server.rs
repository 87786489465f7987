use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use super::lifecycle::serve_with_shutdown;
use super::{ServerError, ServerResult, shutdown_signal};
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Serves `app` over plain HTTP until SIGINT or SIGTERM.
pub async fn serve_http(app: Router, config: ServerConfig) -> ServerResult<()> {
    let addr = config.server_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| ServerError::bind_error(&addr.to_string(), err))?;
    tracing::info!(target: TRACING_TARGET_SERVER_STARTUP, %addr, "Listening");

    let shutdown = shutdown_signal(config.shutdown_timeout());
    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    serve_with_shutdown(&config, || async move {
        axum::serve(listener, service)
            .with_graceful_shutdown(shutdown)
            .await
    })
    .await
    .map_err(ServerError::Runtime)
}
