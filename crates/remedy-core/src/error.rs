//! Error type shared by every remediation step.
//!
//! The [`ErrorKind`] decides how a failed task is treated: retryable kinds
//! are redelivered by the queue, the rest fail the task for good.

use strum::{Display, IntoStaticStr};
use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request or a payload is unusable, e.g. a malformed output URL.
    InvalidInput,
    NetworkError,
    /// An external service refused our credentials.
    Authentication,
    ServiceUnavailable,
    InternalError,
    /// An external service answered with something we cannot use.
    ExternalError,
    /// A required setting is missing, e.g. an unconfigured remediation API.
    Configuration,
    /// Missing row or a correlation id that is no longer current.
    NotFound,
    /// The remediation state does not allow the transition.
    Conflict,
    Timeout,
    Serialization,
}

impl ErrorKind {
    /// Returns whether running the same task again may succeed.
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkError
                | Self::ServiceUnavailable
                | Self::ExternalError
                | Self::Timeout
                | Self::InternalError
        )
    }
}

#[derive(Debug, Error)]
#[error("{kind}{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    pub kind: ErrorKind,
    /// Detail safe to log and to show to operators.
    pub message: Option<String>,
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    pub fn authentication() -> Self {
        Self::new(ErrorKind::Authentication)
    }

    pub fn service_unavailable() -> Self {
        Self::new(ErrorKind::ServiceUnavailable)
    }

    pub fn internal_error() -> Self {
        Self::new(ErrorKind::InternalError)
    }

    pub fn external_error() -> Self {
        Self::new(ErrorKind::ExternalError)
    }

    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn conflict() -> Self {
        Self::new(ErrorKind::Conflict)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// See [`ErrorKind::is_retryable`].
    #[inline]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message("failed to (de)serialize JSON")
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let error = Error::not_found().with_message("no file holds correlation id uuid-1");
        assert_eq!(
            error.to_string(),
            "not_found: no file holds correlation id uuid-1"
        );
        assert_eq!(Error::conflict().to_string(), "conflict");
    }

    #[test]
    fn only_transient_kinds_are_retried() {
        assert!(Error::network_error().is_retryable());
        assert!(Error::timeout().is_retryable());
        assert!(!Error::configuration().is_retryable());
        assert!(!Error::authentication().is_retryable());
        assert!(!Error::invalid_input().is_retryable());
        assert!(!Error::not_found().is_retryable());
    }
}
