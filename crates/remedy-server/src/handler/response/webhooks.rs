use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Body returned to the remediation service.
///
/// The service only reads `message` on success and `error` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookReply {
    /// `200 { "message": ... }`
    Handled(String),
    /// `400 { "error": ... }`
    Rejected(String),
    /// `500 { "error": ... }`
    Failed(String),
}

impl WebhookReply {
    /// Returns the status code of the reply.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Handled(_) => StatusCode::OK,
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Handled(message) => json!({ "message": message }),
            Self::Rejected(error) | Self::Failed(error) => json!({ "error": error }),
        };
        (status, Json(body)).into_response()
    }
}
