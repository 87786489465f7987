use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::service::TriggerOutcome;

/// Result of evaluating a download for auto-remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DownloadStatus {
    /// Submission of the version was scheduled.
    Scheduled,
    /// The version does not qualify.
    Ineligible,
    /// Another request already started remediation.
    AlreadyStarted,
}

/// Response of the download trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTrigger {
    /// What happened.
    pub status: DownloadStatus,
}

impl From<TriggerOutcome> for DownloadTrigger {
    fn from(outcome: TriggerOutcome) -> Self {
        let status = match outcome {
            TriggerOutcome::Scheduled => DownloadStatus::Scheduled,
            TriggerOutcome::Ineligible => DownloadStatus::Ineligible,
            TriggerOutcome::AlreadyStarted => DownloadStatus::AlreadyStarted,
        };
        Self { status }
    }
}

/// Response of an operator resubmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resubmission {
    /// Correlation id of the new job.
    pub correlation_id: String,
}
