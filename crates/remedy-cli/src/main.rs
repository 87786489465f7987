#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use remedy_server::handler::routes;
use remedy_server::middleware::RouterExt;
use remedy_server::service::ServiceState;
use remedy_server::worker::WorkerHandles;

use crate::config::{Cli, ServerConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "remedy_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "remedy_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "remedy_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing()?;
    cli.log();
    cli.validate()?;

    let backends = cli
        .service
        .connect()
        .await
        .context("failed to connect to backends")?;
    let state = ServiceState::from_config(&cli.service, &backends)
        .context("failed to create service state")?;

    let workers = WorkerHandles::spawn(&state, &backends.queue, &cli.worker);
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        workers = cli.worker.worker_concurrency,
        "Queue workers started"
    );

    let router = create_router(state, &cli.server);
    let served = server::serve(router, cli.server.clone()).await;

    stop_workers(workers, &cli.server).await;

    if let Err(error) = &served
        && let Some(suggestion) = error.suggestion()
    {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            suggestion,
            "Recovery suggestion"
        );
    }
    served.context("HTTP server failed")?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Error handling (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, config: &ServerConfig) -> Router {
    let api_routes: Router = routes(state.clone()).with_state(state);

    api_routes
        .with_observability_layer()
        .with_error_handling_layer(config.request_timeout())
}

/// Lets workers finish their current task, aborting them after the
/// shutdown timeout.
async fn stop_workers(workers: WorkerHandles, config: &ServerConfig) {
    match workers.shutdown_within(config.shutdown_timeout()).await {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                "Queue workers stopped"
            );
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %error,
                "Queue workers did not stop cleanly"
            );
        }
    }
}
