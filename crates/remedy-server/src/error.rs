//! Startup errors of the orchestrator.
//!
//! Raised while backends are connected, settings are checked and workers
//! are joined. A failing remediation step reports [`remedy_core::Error`]
//! instead.

use std::error::Error as StdError;

/// Boxed source error.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which side of the startup went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A setting is missing or out of range.
    Config,
    /// Postgres, NATS or an HTTP backend could not be reached.
    External,
    /// A worker crashed or did not stop in time.
    Internal,
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    fn new(kind: ErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            source: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message.into())
    }

    /// Failure of the backend named by `component`.
    pub fn external(component: &str, message: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::External, format!("{component}: {message}"))
    }

    pub fn internal(component: &str, message: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Internal, format!("{component}: {message}"))
    }

    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<remedy_nats::Error> for Error {
    fn from(err: remedy_nats::Error) -> Self {
        Self::external("nats", &err).with_source(err)
    }
}

impl From<remedy_postgres::PgError> for Error {
    fn from(err: remedy_postgres::PgError) -> Self {
        Self::external("postgres", &err).with_source(err)
    }
}

impl From<remedy_reqwest::Error> for Error {
    fn from(err: remedy_reqwest::Error) -> Self {
        match err {
            remedy_reqwest::Error::Config(message) => Self::config(message),
            err => Self::external("http", &err).with_source(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_name_the_component() {
        let error = Error::external("nats", "connection refused");
        assert_eq!(error.kind(), ErrorKind::External);
        assert_eq!(error.to_string(), "external: nats: connection refused");
    }

    #[test]
    fn missing_http_settings_stay_configuration_errors() {
        let error = Error::from(remedy_reqwest::Error::Config("MAIL_API_URL is not set".into()));
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "MAIL_API_URL is not set");
    }
}
