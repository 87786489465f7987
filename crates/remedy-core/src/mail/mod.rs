//! Outbound email boundary.

mod service;

pub use service::MailService;
use serde::{Deserialize, Serialize};

pub use crate::{Error, Result};

/// Tracing target for mail operations.
pub const TRACING_TARGET: &str = "remedy_core::mail";

/// A rendered message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub text: String,
}

/// Core trait for mail sender implementations.
#[async_trait::async_trait]
pub trait MailProvider: Send + Sync {
    /// Sends one message.
    async fn send(&self, message: &MailMessage) -> Result<()>;
}
