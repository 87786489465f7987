use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body of every error answered by the internal API.
///
/// Webhook rejections use their own `{"error": ...}` shape and never go
/// through this type.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// Stable machine-readable identifier.
    pub name: Cow<'a, str>,
    /// Text safe to show to operators.
    pub message: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

macro_rules! error_response {
    ($const:ident, $name:literal, $status:ident, $message:literal) => {
        pub const $const: Self = Self::new($name, $message, StatusCode::$status);
    };
}

impl<'a> ErrorResponse<'a> {
    error_response!(
        BAD_REQUEST,
        "bad_request",
        BAD_REQUEST,
        "The request could not be processed due to invalid data"
    );
    error_response!(
        INVALID_PATH_PARAM,
        "invalid_path_param",
        BAD_REQUEST,
        "A path parameter is not a valid identifier"
    );
    error_response!(
        UNAUTHORIZED,
        "unauthorized",
        UNAUTHORIZED,
        "Invalid or missing API key"
    );
    error_response!(
        NOT_FOUND,
        "not_found",
        NOT_FOUND,
        "The requested resource was not found"
    );
    error_response!(
        CONFLICT,
        "conflict",
        CONFLICT,
        "The request conflicts with the current remediation state"
    );
    error_response!(
        INTERNAL_SERVER_ERROR,
        "internal_server_error",
        INTERNAL_SERVER_ERROR,
        "An internal server error occurred. Please try again later"
    );
    error_response!(
        BAD_GATEWAY,
        "bad_gateway",
        BAD_GATEWAY,
        "An upstream service rejected the request"
    );
    error_response!(
        SERVICE_UNAVAILABLE,
        "service_unavailable",
        SERVICE_UNAVAILABLE,
        "A required service is temporarily unavailable"
    );

    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            context: None,
            status,
        }
    }

    /// Appends detail to the template message.
    pub fn with_message(mut self, detail: impl Into<Cow<'a, str>>) -> Self {
        self.message = Cow::Owned(format!("{}. {}", self.message, detail.into()));
        self
    }

    /// Adds context; repeated calls are joined with `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(existing) => Cow::Owned(format!("{existing}; {context}")),
            None => context,
        });
        self
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_extends_template_message() {
        let response = ErrorResponse::NOT_FOUND.with_message("version 42");
        assert_eq!(
            response.message,
            "The requested resource was not found. version 42"
        );
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn repeated_context_is_joined() {
        let response = ErrorResponse::BAD_REQUEST
            .with_context("file 7")
            .with_context("text/csv");
        assert_eq!(response.context.as_deref(), Some("file 7; text/csv"));
    }

    #[test]
    fn status_is_not_serialized() -> anyhow::Result<()> {
        let body = serde_json::to_value(ErrorResponse::UNAUTHORIZED)?;
        assert_eq!(body["name"], "unauthorized");
        assert!(body.get("status").is_none());
        assert!(body.get("context").is_none());
        Ok(())
    }
}
