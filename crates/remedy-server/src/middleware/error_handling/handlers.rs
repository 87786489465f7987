use std::future::ready;

use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt};
use tower::BoxError;
use tower::timeout::error::Elapsed;

use crate::handler::ErrorKind;
use crate::middleware::TRACING_TARGET_ERROR;

/// Turns a failure raised by a tower layer into a JSON error response.
///
/// Handlers never reach this point; they answer with their own errors. Only
/// the timeout layer and unexpected layer failures do.
pub fn handle_error(err: BoxError) -> BoxFuture<'static, Response> {
    let response = if err.is::<Elapsed>() {
        tracing::warn!(target: TRACING_TARGET_ERROR, "Request exceeded its deadline");
        ErrorKind::ServiceUnavailable
            .with_message("Request timeout")
            .with_context("the request was cancelled before it completed")
            .into_response()
    } else {
        tracing::error!(target: TRACING_TARGET_ERROR, error = %err, "Layer failed");
        ErrorKind::InternalServerError
            .with_context(err.to_string())
            .into_response()
    };

    ready(response).boxed()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn elapsed_deadline_is_unavailable() {
        let response = handle_error(Box::new(Elapsed::new())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn other_layer_errors_are_internal() {
        let response = handle_error("connection reset".into()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
