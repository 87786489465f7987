use remedy_core::types::ActorRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::DownloadRequest;

/// A download of a document version reported by the repository frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEvent {
    /// Version whose files were downloaded.
    pub version_id: Uuid,
    /// Role of the downloading actor.
    #[serde(default)]
    pub actor_role: ActorRole,
    /// Whether the download path can trigger remediation.
    pub remediation_capable: bool,
}

impl DownloadEvent {
    /// Converts the event into the service request.
    pub fn into_request(self) -> DownloadRequest {
        DownloadRequest {
            version_id: self.version_id,
            actor_role: self.actor_role,
            remediation_capable: self.remediation_capable,
        }
    }
}
