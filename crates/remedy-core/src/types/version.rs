use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::{Contributor, FileResource};

/// Publication state of a document version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PublicationState {
    /// Still being edited by the depositor.
    #[default]
    Draft,
    /// Publicly visible.
    Published,
    /// Removed from public view.
    Withdrawn,
}

/// Immutable snapshot of a work's metadata and files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// Parent work.
    pub work_id: Uuid,
    /// Monotonic number within the work, starting at 1.
    pub version_number: i32,
    /// Publication state.
    pub publication_state: PublicationState,
    /// Version title.
    pub title: String,
    /// Free-form descriptive metadata.
    pub metadata: serde_json::Value,
    /// Ordered contributors.
    pub contributors: Vec<Contributor>,
    /// Set once, when auto-remediation was first triggered for this version.
    pub auto_remediation_started_at: Option<Timestamp>,
    /// Auto-remediated version produced from this one.
    pub remediated_version_id: Option<Uuid>,
    /// Whether this version is itself the output of auto-remediation.
    pub is_auto_remediated: bool,
    /// Timestamp when the version was created.
    pub created_at: Timestamp,
    /// Timestamp when the version was published.
    pub published_at: Option<Timestamp>,
}

impl DocumentVersion {
    /// Returns whether the version is published.
    #[inline]
    pub fn is_published(&self) -> bool {
        self.publication_state == PublicationState::Published
    }

    /// Returns whether auto-remediation was already triggered.
    #[inline]
    pub fn has_remediation_started(&self) -> bool {
        self.auto_remediation_started_at.is_some()
    }

    /// Returns whether a remediated output already exists for this version.
    #[inline]
    pub fn has_remediated_output(&self) -> bool {
        self.remediated_version_id.is_some()
    }
}

/// Identity of a file inside a version for change detection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// Original filename.
    pub filename: String,
    /// Hex encoded SHA-256 digest of the content.
    pub sha256: String,
}

impl From<&FileResource> for FileFingerprint {
    fn from(file: &FileResource) -> Self {
        Self {
            filename: file.filename.clone(),
            sha256: file.sha256.clone(),
        }
    }
}

/// The parts of a version that decide whether two versions differ.
///
/// Two versions with equal metadata and the same set of files are the same
/// version; creating the second one would only add noise to the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionContent {
    /// Version title.
    pub title: String,
    /// Descriptive metadata.
    pub metadata: serde_json::Value,
    /// Ordered contributors.
    pub contributors: Vec<Contributor>,
    /// Files, compared as a set.
    pub files: Vec<FileFingerprint>,
}

impl VersionContent {
    /// Captures the comparable content of a version and its files.
    pub fn capture(version: &DocumentVersion, files: &[FileResource]) -> Self {
        Self {
            title: version.title.clone(),
            metadata: version.metadata.clone(),
            contributors: version.contributors.clone(),
            files: files.iter().map(FileFingerprint::from).collect(),
        }
    }

    /// Replaces the fingerprint of one file, keeping its position.
    pub fn with_replaced_file(mut self, old: &FileFingerprint, new: FileFingerprint) -> Self {
        if let Some(slot) = self.files.iter_mut().find(|f| *f == old) {
            *slot = new;
        }
        self
    }

    /// Returns whether `self` differs materially from `predecessor`.
    pub fn differs_from(&self, predecessor: &Self) -> bool {
        if self.title != predecessor.title
            || self.metadata != predecessor.metadata
            || self.contributors != predecessor.contributors
        {
            return true;
        }

        let mut ours = self.files.clone();
        let mut theirs = predecessor.files.clone();
        ours.sort();
        theirs.sort();
        ours != theirs
    }
}
