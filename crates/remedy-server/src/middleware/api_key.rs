use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::TRACING_TARGET_AUTH;
use crate::handler::ErrorKind;
use crate::service::RemediationSettings;

/// Requires the webhook key in `X-API-KEY`.
///
/// Rejections carry no body; the remediation service only looks at the status.
pub async fn require_webhook_key(
    State(settings): State<RemediationSettings>,
    request: Request,
    next: Next,
) -> Response {
    if !settings.webhook_key().verify_headers(request.headers()) {
        tracing::warn!(
            target: TRACING_TARGET_AUTH,
            path = %request.uri().path(),
            "Rejected webhook with missing or invalid key"
        );
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(request).await
}

/// Requires the internal API key in `X-API-KEY`.
pub async fn require_internal_key(
    State(settings): State<RemediationSettings>,
    request: Request,
    next: Next,
) -> Response {
    if !settings.internal_key().verify_headers(request.headers()) {
        tracing::warn!(
            target: TRACING_TARGET_AUTH,
            path = %request.uri().path(),
            "Rejected internal request with missing or invalid key"
        );
        return ErrorKind::Unauthorized.into_response();
    }

    next.run(request).await
}
