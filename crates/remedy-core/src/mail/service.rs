//! Mail service wrapper with observability.

use std::fmt;
use std::sync::Arc;

use super::{MailMessage, MailProvider, Result, TRACING_TARGET};

/// Mail service wrapper with observability.
#[derive(Clone)]
pub struct MailService {
    inner: Arc<dyn MailProvider>,
}

impl fmt::Debug for MailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailService").finish_non_exhaustive()
    }
}

impl MailService {
    /// Create a new mail service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: MailProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Sends one message.
    pub async fn send(&self, message: &MailMessage) -> Result<()> {
        let result = self.inner.send(message).await;

        match &result {
            Ok(()) => tracing::debug!(
                target: TRACING_TARGET,
                subject = %message.subject,
                "Mail sent"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                subject = %message.subject,
                error = %error,
                "Mail delivery failed"
            ),
        }

        result
    }
}
