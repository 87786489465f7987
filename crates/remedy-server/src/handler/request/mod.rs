//! Request types for HTTP handlers.

mod paths;
mod remediation;
mod webhooks;

pub use paths::FilePathParams;
pub use remediation::DownloadEvent;
pub use webhooks::{JobPayload, WebhookEvent};
