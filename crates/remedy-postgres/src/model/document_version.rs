//! Document version model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use remedy_core::types::{self, Contributor};
use uuid::Uuid;

use crate::schema::document_versions;
use crate::types::PublicationState;

/// Document version model representing one immutable snapshot of a work.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = document_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// Parent work.
    pub work_id: Uuid,
    /// Monotonic number within the work.
    pub version_number: i32,
    /// Publication state.
    pub publication_state: PublicationState,
    /// Version title.
    pub title: String,
    /// Descriptive metadata.
    pub metadata: serde_json::Value,
    /// Timestamp when auto-remediation was triggered.
    pub auto_remediation_started_at: Option<Timestamp>,
    /// Auto-remediated version produced from this one.
    pub remediated_version_id: Option<Uuid>,
    /// Whether this version is the output of auto-remediation.
    pub is_auto_remediated: bool,
    /// Timestamp when the version was created.
    pub created_at: Timestamp,
    /// Timestamp when the version was published.
    pub published_at: Option<Timestamp>,
}

/// Data for creating a new document version.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentVersion {
    /// Identifier of the new version.
    pub id: Uuid,
    /// Parent work.
    pub work_id: Uuid,
    /// Monotonic number within the work.
    pub version_number: i32,
    /// Publication state.
    pub publication_state: PublicationState,
    /// Version title.
    pub title: String,
    /// Descriptive metadata.
    pub metadata: serde_json::Value,
    /// Whether this version is the output of auto-remediation.
    pub is_auto_remediated: bool,
    /// Timestamp when the version was published.
    pub published_at: Option<Timestamp>,
}

impl NewDocumentVersion {
    /// Builds the published auto-remediated successor of `base`.
    pub fn remediated_from(base: &DocumentVersion, version_number: i32, at: jiff::Timestamp) -> Self {
        Self {
            id: Uuid::now_v7(),
            work_id: base.work_id,
            version_number,
            publication_state: PublicationState::Published,
            title: base.title.clone(),
            metadata: base.metadata.clone(),
            is_auto_remediated: true,
            published_at: Some(at.into()),
        }
    }
}

impl DocumentVersion {
    /// Converts the row into a domain version with its contributors.
    pub fn into_domain(self, contributors: Vec<Contributor>) -> types::DocumentVersion {
        types::DocumentVersion {
            id: self.id,
            work_id: self.work_id,
            version_number: self.version_number,
            publication_state: self.publication_state.into(),
            title: self.title,
            metadata: self.metadata,
            contributors,
            auto_remediation_started_at: self.auto_remediation_started_at.map(Into::into),
            remediated_version_id: self.remediated_version_id,
            is_auto_remediated: self.is_auto_remediated,
            created_at: self.created_at.into(),
            published_at: self.published_at.map(Into::into),
        }
    }
}
