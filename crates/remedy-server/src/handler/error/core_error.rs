//! Conversion of [`remedy_core::Error`] into HTTP errors.

use remedy_core::ErrorKind as CoreKind;

use super::{Error, ErrorKind};

/// Tracing target for errors converted at the HTTP boundary.
const TRACING_TARGET: &str = "remedy_server::handler::error";

impl From<remedy_core::Error> for Error<'static> {
    fn from(error: remedy_core::Error) -> Self {
        let kind = match error.kind {
            CoreKind::InvalidInput => ErrorKind::BadRequest,
            CoreKind::NotFound => ErrorKind::NotFound,
            CoreKind::Conflict => ErrorKind::Conflict,
            CoreKind::Authentication | CoreKind::ExternalError => ErrorKind::BadGateway,
            CoreKind::NetworkError
            | CoreKind::ServiceUnavailable
            | CoreKind::Timeout
            | CoreKind::Configuration => ErrorKind::ServiceUnavailable,
            CoreKind::InternalError | CoreKind::Serialization => {
                ErrorKind::InternalServerError
            }
        };

        if kind.status_code().is_server_error() {
            tracing::error!(target: TRACING_TARGET, error = %error, "Request failed");
        } else {
            tracing::debug!(target: TRACING_TARGET, error = %error, "Request rejected");
        }

        let error = match kind {
            ErrorKind::BadRequest | ErrorKind::NotFound | ErrorKind::Conflict => {
                kind.with_message(error.message.unwrap_or_default())
            }
            _ => kind.with_context(error.kind.to_string()),
        };

        error.into_static()
    }
}
