//! Domain types shared by every remedy crate.

mod file;
mod remediation;
mod task;
mod version;
mod work;

pub use file::{FileResource, NewFileResource, PDF_MIME_TYPE};
pub use remediation::{
    EventType, RemediationCommit, RemediationOutcome, RemediationResolution, RemediationState,
    RemediationStatus,
};
pub use task::{RemediationTask, TaskKind};
pub use version::{DocumentVersion, FileFingerprint, PublicationState, VersionContent};
pub use work::{ActorRole, Contributor, Work};
