use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RemediationStatus;

/// MIME type of files that qualify for remediation.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// One uploaded binary file, shared by every version that includes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResource {
    /// Unique file identifier.
    pub id: Uuid,
    /// Work the file was deposited into.
    pub work_id: Uuid,
    /// Original filename.
    pub filename: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Hex encoded SHA-256 digest of the content.
    pub sha256: String,
    /// Size of the content in bytes.
    pub size_bytes: i64,
    /// Key of the content in the backing storage.
    pub storage_key: String,
    /// Source file, when this file is a remediated artifact.
    pub remediated_from_id: Option<Uuid>,
    /// Remediation status.
    pub remediation: RemediationStatus,
    /// Timestamp when the file was uploaded.
    pub created_at: Timestamp,
}

impl FileResource {
    /// Returns whether the content type qualifies for remediation.
    pub fn is_pdf(&self) -> bool {
        let essence = self
            .mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        essence.eq_ignore_ascii_case(PDF_MIME_TYPE)
    }

    /// Returns whether the file was produced by remediation.
    #[inline]
    pub fn is_remediated_artifact(&self) -> bool {
        self.remediated_from_id.is_some()
    }
}

/// A file resource about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFileResource {
    /// Identifier chosen by the caller, also used as the storage key.
    pub id: Uuid,
    /// Work the file belongs to.
    pub work_id: Uuid,
    /// Original filename.
    pub filename: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Hex encoded SHA-256 digest of the content.
    pub sha256: String,
    /// Size of the content in bytes.
    pub size_bytes: i64,
    /// Key of the content in the backing storage.
    pub storage_key: String,
    /// Source file, when this file is a remediated artifact.
    pub remediated_from_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(mime_type: &str) -> FileResource {
        FileResource {
            id: Uuid::now_v7(),
            work_id: Uuid::now_v7(),
            filename: "thesis.pdf".to_owned(),
            mime_type: mime_type.to_owned(),
            sha256: "00".to_owned(),
            size_bytes: 1,
            storage_key: "thesis".to_owned(),
            remediated_from_id: None,
            remediation: RemediationStatus::NotStarted,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn pdf_detection_ignores_case_and_parameters() {
        assert!(file("application/pdf").is_pdf());
        assert!(file("Application/PDF").is_pdf());
        assert!(file("application/pdf; version=1.7").is_pdf());
        assert!(!file("text/csv").is_pdf());
        assert!(!file("application/pdfx").is_pdf());
    }
}
