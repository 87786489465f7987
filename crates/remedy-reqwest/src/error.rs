//! Internal error types for remedy-reqwest.

use thiserror::Error;

/// Result type alias for remedy-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for remedy-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Error> for remedy_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    remedy_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    remedy_core::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    remedy_core::Error::external_error()
                        .with_message("Unreadable response body")
                        .with_source(e)
                } else {
                    remedy_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => remedy_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Config(message) => remedy_core::Error::configuration().with_message(message),
        }
    }
}
