//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! - `/webhooks/remediation`: remediation service callbacks, webhook key
//! - `/api/remediation/*`: internal API, internal key
//! - `/health`: public liveness probe
//!
//! ```rust,no_run
//! use remedy_server::handler::routes;
//! use remedy_server::service::ServiceState;
//!
//! fn app(state: ServiceState) -> axum::Router {
//!     routes(state.clone()).with_state(state)
//! }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod health;
mod remediation;
mod request;
mod response;
mod webhooks;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{DownloadEvent, FilePathParams, JobPayload, WebhookEvent};
pub use crate::handler::response::{
    DownloadStatus, DownloadTrigger, Health, Resubmission, WebhookReply,
};
use crate::middleware::{require_internal_key, require_webhook_key};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes.
pub fn routes(state: ServiceState) -> Router<ServiceState> {
    let require_webhook_key = from_fn_with_state(state.settings.clone(), require_webhook_key);
    let require_internal_key = from_fn_with_state(state.settings.clone(), require_internal_key);

    // Authenticated by the remediation service's shared secret
    let webhook_router = webhooks::routes().route_layer(require_webhook_key);

    // Authenticated by the internal key of the repository frontend
    let internal_router = remediation::routes().route_layer(require_internal_key);

    Router::new()
        .merge(webhook_router)
        .merge(internal_router)
        .merge(health::routes())
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;

    use crate::handler::routes;
    use crate::service::testing::Harness;

    /// Returns a new [`TestServer`] serving every route over the harness.
    pub fn create_test_server(harness: &Harness) -> anyhow::Result<TestServer> {
        let state = harness.state.clone();
        let app = routes(state.clone()).with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let harness = Harness::new(false);
        let server = create_test_server(&harness)?;

        let response = server.get("/api/unknown").await;
        response.assert_status_not_found();
        Ok(())
    }
}
