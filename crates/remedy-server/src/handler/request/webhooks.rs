use serde::{Deserialize, Serialize};

/// Job callback delivered by the remediation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// `job.succeeded`, `job.failed` or anything else.
    pub event_type: String,
    /// The job the event refers to.
    #[serde(default)]
    pub job: JobPayload,
}

/// Job fields of a [`WebhookEvent`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Correlation id issued at submission.
    #[serde(default)]
    pub uuid: String,
    /// Location of the remediated artifact, on success.
    #[serde(default)]
    pub output_url: Option<String>,
    /// Reason reported by the service, on failure.
    #[serde(default)]
    pub processing_error_message: Option<String>,
}
