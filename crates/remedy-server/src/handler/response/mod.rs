//! Response types for HTTP handlers.

mod error_response;
mod health;
mod remediation;
mod webhooks;

pub use error_response::ErrorResponse;
pub use health::Health;
pub use remediation::{DownloadStatus, DownloadTrigger, Resubmission};
pub use webhooks::WebhookReply;
