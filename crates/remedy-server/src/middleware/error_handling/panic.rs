use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::handler::ErrorKind;
use crate::middleware::TRACING_TARGET_ERROR;

/// Answers a panicking handler with a bare 500.
pub fn catch_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    tracing::error!(target: TRACING_TARGET_ERROR, panic = message, "Handler panicked");
    ErrorKind::InternalServerError.into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn panic_becomes_internal_error() {
        let response = catch_panic(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
