use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::catch_panic::CatchPanicLayer;

use crate::middleware::error_handling::{catch_panic, handle_error};
use crate::middleware::observability;

/// Layers shared by every route of the orchestrator.
pub trait RouterExt<S> {
    /// Bounds each request by `timeout` and turns panics and layer failures
    /// into JSON errors.
    fn with_error_handling_layer(self, timeout: Duration) -> Self;

    /// Assigns and echoes `x-request-id` and traces requests with the API key
    /// header redacted.
    fn with_observability_layer(self) -> Self;
}

impl<S> RouterExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_error_handling_layer(self, timeout: Duration) -> Self {
        self.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_error))
                .layer(CatchPanicLayer::custom(catch_panic))
                .layer(TimeoutLayer::new(timeout)),
        )
    }

    fn with_observability_layer(self) -> Self {
        // The outermost layer is added last, so the id is set before tracing.
        self.layer(observability::propagate_request_id())
            .layer(observability::redact_credentials())
            .layer(observability::trace_requests())
            .layer(observability::set_request_id())
    }
}
