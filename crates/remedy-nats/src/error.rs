//! Errors raised by the queue, the artifact bucket and the connection.

use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("NATS connection error: {0}")]
    Connection(#[from] async_nats::Error),

    /// A task or artifact payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("NATS did not answer within {0:?}")]
    Timeout(Duration),

    /// JetStream did not acknowledge a published task.
    #[error("Publishing to '{subject}' failed: {reason}")]
    Publish { subject: String, reason: String },

    #[error("Stream '{stream}' is unavailable: {reason}")]
    Stream { stream: String, reason: String },

    #[error("Consumer '{consumer}' is unavailable: {reason}")]
    Consumer { consumer: String, reason: String },

    #[error("Invalid NATS settings: {0}")]
    Config(String),

    /// Any other JetStream call, named by `operation`.
    #[error("NATS {operation} failed: {reason}")]
    Operation { operation: &'static str, reason: String },
}

impl Error {
    pub fn publish(subject: impl Into<String>, reason: impl ToString) -> Self {
        Self::Publish {
            subject: subject.into(),
            reason: reason.to_string(),
        }
    }

    pub fn stream(stream: impl Into<String>, reason: impl ToString) -> Self {
        Self::Stream {
            stream: stream.into(),
            reason: reason.to_string(),
        }
    }

    pub fn consumer(consumer: impl Into<String>, reason: impl ToString) -> Self {
        Self::Consumer {
            consumer: consumer.into(),
            reason: reason.to_string(),
        }
    }

    pub fn operation(operation: &'static str, reason: impl ToString) -> Self {
        Self::Operation {
            operation,
            reason: reason.to_string(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }
}

impl From<Error> for remedy_core::Error {
    fn from(error: Error) -> Self {
        use remedy_core::ErrorKind;

        let kind = match &error {
            Error::Connection(_) | Error::Publish { .. } => ErrorKind::ServiceUnavailable,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Config(_) => ErrorKind::Configuration,
            Error::Stream { .. } | Error::Consumer { .. } | Error::Operation { .. } => {
                ErrorKind::ExternalError
            }
        };

        remedy_core::Error::new(kind)
            .with_message("NATS operation failed")
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use remedy_core::ErrorKind;

    use super::*;

    #[test]
    fn unacknowledged_publish_is_retryable() {
        let error: remedy_core::Error =
            Error::publish("remedy.tasks.submit_version", "no responders").into();
        assert_eq!(error.kind, ErrorKind::ServiceUnavailable);
        assert!(error.is_retryable());
    }

    #[test]
    fn bad_settings_are_not_retryable() {
        let error: remedy_core::Error = Error::config("NATS_URL is empty").into();
        assert_eq!(error.kind, ErrorKind::Configuration);
        assert!(!error.is_retryable());
    }
}
