//! File resource model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use remedy_core::types::{self, RemediationStatus};
use uuid::Uuid;

use crate::schema::file_resources;
use crate::types::RemediationState;
use crate::{PgError, PgResult};

/// File resource model representing one uploaded binary.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = file_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FileResource {
    /// Unique file identifier
    pub id: Uuid,
    /// Work the file was deposited into
    pub work_id: Uuid,
    /// Original filename
    pub filename: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Hex encoded SHA-256 digest
    pub sha256: String,
    /// Content size in bytes
    pub size_bytes: i64,
    /// Storage key of the content
    pub storage_key: String,
    /// Source file of a remediated artifact
    pub remediated_from_id: Option<Uuid>,
    /// Remediation state
    pub remediation_state: RemediationState,
    /// Current correlation id
    pub correlation_id: Option<String>,
    /// Artifact location of a succeeded job
    pub output_url: Option<String>,
    /// Failure reason of a failed job
    pub failure_reason: Option<String>,
    /// Timestamp of the current submission
    pub remediation_submitted_at: Option<Timestamp>,
    /// Timestamp when the job succeeded
    pub remediation_completed_at: Option<Timestamp>,
    /// Timestamp when the job failed
    pub remediation_failed_at: Option<Timestamp>,
    /// Timestamp when the file was uploaded
    pub created_at: Timestamp,
    /// Timestamp when the file was last updated
    pub updated_at: Timestamp,
}

/// Data for creating a new file resource.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = file_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFileResource {
    /// Identifier of the new file
    pub id: Uuid,
    /// Work the file belongs to
    pub work_id: Uuid,
    /// Original filename
    pub filename: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Hex encoded SHA-256 digest
    pub sha256: String,
    /// Content size in bytes
    pub size_bytes: i64,
    /// Storage key of the content
    pub storage_key: String,
    /// Source file of a remediated artifact
    pub remediated_from_id: Option<Uuid>,
}

impl From<types::NewFileResource> for NewFileResource {
    fn from(file: types::NewFileResource) -> Self {
        Self {
            id: file.id,
            work_id: file.work_id,
            filename: file.filename,
            mime_type: file.mime_type,
            sha256: file.sha256,
            size_bytes: file.size_bytes,
            storage_key: file.storage_key,
            remediated_from_id: file.remediated_from_id,
        }
    }
}

/// Remediation columns written on every state transition.
///
/// Columns that do not belong to the new state are cleared.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = file_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct UpdateRemediation {
    /// Remediation state
    pub remediation_state: RemediationState,
    /// Current correlation id
    pub correlation_id: Option<String>,
    /// Artifact location
    pub output_url: Option<String>,
    /// Failure reason
    pub failure_reason: Option<String>,
    /// Submission timestamp
    pub remediation_submitted_at: Option<Timestamp>,
    /// Success timestamp
    pub remediation_completed_at: Option<Timestamp>,
    /// Failure timestamp
    pub remediation_failed_at: Option<Timestamp>,
    /// Last update timestamp
    pub updated_at: Timestamp,
}

impl From<&RemediationStatus> for UpdateRemediation {
    fn from(status: &RemediationStatus) -> Self {
        let mut update = Self {
            remediation_state: status.state().into(),
            correlation_id: status.current_correlation_id().map(str::to_owned),
            output_url: None,
            failure_reason: None,
            remediation_submitted_at: None,
            remediation_completed_at: None,
            remediation_failed_at: None,
            updated_at: jiff::Timestamp::now().into(),
        };

        match status {
            RemediationStatus::NotStarted => {}
            RemediationStatus::Submitted { submitted_at, .. } => {
                update.remediation_submitted_at = Some((*submitted_at).into());
            }
            RemediationStatus::Succeeded {
                output_url,
                completed_at,
                ..
            } => {
                update.output_url = Some(output_url.clone());
                update.remediation_completed_at = Some((*completed_at).into());
            }
            RemediationStatus::Failed {
                reason, failed_at, ..
            } => {
                update.failure_reason = Some(reason.clone());
                update.remediation_failed_at = Some((*failed_at).into());
            }
        }

        update
    }
}

impl FileResource {
    /// Rebuilds the tagged remediation status from its columns.
    pub fn remediation_status(&self) -> PgResult<RemediationStatus> {
        let inconsistent = || {
            PgError::Unexpected(
                format!(
                    "file {} has inconsistent remediation columns for state {}",
                    self.id, self.remediation_state
                )
                .into(),
            )
        };

        let status = match self.remediation_state {
            RemediationState::NotStarted => RemediationStatus::NotStarted,
            RemediationState::Submitted => RemediationStatus::Submitted {
                correlation_id: self.correlation_id.clone().ok_or_else(inconsistent)?,
                submitted_at: self.remediation_submitted_at.ok_or_else(inconsistent)?.into(),
            },
            RemediationState::Succeeded => RemediationStatus::Succeeded {
                correlation_id: self.correlation_id.clone().ok_or_else(inconsistent)?,
                output_url: self.output_url.clone().ok_or_else(inconsistent)?,
                completed_at: self.remediation_completed_at.ok_or_else(inconsistent)?.into(),
            },
            RemediationState::Failed => RemediationStatus::Failed {
                correlation_id: self.correlation_id.clone().ok_or_else(inconsistent)?,
                reason: self.failure_reason.clone().unwrap_or_default(),
                failed_at: self.remediation_failed_at.ok_or_else(inconsistent)?.into(),
            },
        };

        Ok(status)
    }

    /// Converts the row into a domain file resource.
    pub fn into_domain(self) -> PgResult<types::FileResource> {
        let remediation = self.remediation_status()?;
        Ok(types::FileResource {
            id: self.id,
            work_id: self.work_id,
            filename: self.filename,
            mime_type: self.mime_type,
            sha256: self.sha256,
            size_bytes: self.size_bytes,
            storage_key: self.storage_key,
            remediated_from_id: self.remediated_from_id,
            remediation,
            created_at: self.created_at.into(),
        })
    }
}
