//! Document and file store consumed by the orchestrator.

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;
use uuid::Uuid;

use crate::Result;
use crate::types::{
    DocumentVersion, EventType, FileResource, RemediationCommit, RemediationOutcome, Work,
};

/// Shared handle to a [`DocumentStore`] implementation.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Persistence boundary for works, versions and file resources.
///
/// Lookups return `Ok(None)` for missing rows; mutations that target a
/// missing or stale row return an error of kind [`NotFound`].
///
/// [`NotFound`]: crate::ErrorKind::NotFound
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Finds a work by id.
    async fn find_work(&self, work_id: Uuid) -> Result<Option<Work>>;

    /// Finds a version by id, including its contributors.
    async fn find_version(&self, version_id: Uuid) -> Result<Option<DocumentVersion>>;

    /// Returns the published version with the highest number for a work.
    async fn latest_published_version(&self, work_id: Uuid) -> Result<Option<DocumentVersion>>;

    /// Lists the files of a version in their display order.
    async fn list_version_files(&self, version_id: Uuid) -> Result<Vec<FileResource>>;

    /// Finds a file by id.
    async fn find_file(&self, file_id: Uuid) -> Result<Option<FileResource>>;

    /// Finds the file whose current correlation id equals `correlation_id`.
    async fn find_file_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> Result<Option<FileResource>>;

    /// Sets `auto_remediation_started_at` if it is still unset.
    ///
    /// Returns `true` only for the caller that performed the write.
    async fn mark_remediation_started(&self, version_id: Uuid, at: Timestamp) -> Result<bool>;

    /// Stores a new correlation id on a file, superseding any earlier one.
    async fn record_submission(
        &self,
        file_id: Uuid,
        correlation_id: &str,
        at: Timestamp,
    ) -> Result<FileResource>;

    /// Marks the file holding `correlation_id` as failed.
    async fn record_failure(
        &self,
        correlation_id: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<FileResource>;

    /// Returns whether an event was already applied.
    async fn is_event_processed(&self, correlation_id: &str, event_type: EventType)
    -> Result<bool>;

    /// Applies a success event exactly once.
    ///
    /// In a single transaction: re-checks that the file still holds the
    /// correlation id, claims the `(correlation_id, job.succeeded)` ledger
    /// entry, builds the new version when requested and marks the file as
    /// succeeded. A second call for the same correlation id returns
    /// [`RemediationOutcome::AlreadyProcessed`].
    async fn commit_remediation(&self, commit: RemediationCommit) -> Result<RemediationOutcome>;
}

impl fmt::Debug for dyn DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyStore;

    #[async_trait::async_trait]
    impl DocumentStore for EmptyStore {
        async fn find_work(&self, _: Uuid) -> Result<Option<Work>> {
            Ok(None)
        }

        async fn find_version(&self, _: Uuid) -> Result<Option<DocumentVersion>> {
            Ok(None)
        }

        async fn latest_published_version(&self, _: Uuid) -> Result<Option<DocumentVersion>> {
            Ok(None)
        }

        async fn list_version_files(&self, _: Uuid) -> Result<Vec<FileResource>> {
            Ok(Vec::new())
        }

        async fn find_file(&self, _: Uuid) -> Result<Option<FileResource>> {
            Ok(None)
        }

        async fn find_file_by_correlation_id(&self, _: &str) -> Result<Option<FileResource>> {
            Ok(None)
        }

        async fn mark_remediation_started(&self, _: Uuid, _: Timestamp) -> Result<bool> {
            Ok(false)
        }

        async fn record_submission(&self, _: Uuid, _: &str, _: Timestamp) -> Result<FileResource> {
            Err(crate::Error::not_found())
        }

        async fn record_failure(&self, _: &str, _: &str, _: Timestamp) -> Result<FileResource> {
            Err(crate::Error::not_found())
        }

        async fn is_event_processed(&self, _: &str, _: EventType) -> Result<bool> {
            Ok(false)
        }

        async fn commit_remediation(&self, _: RemediationCommit) -> Result<RemediationOutcome> {
            Err(crate::Error::not_found())
        }
    }

    #[derive(Debug)]
    struct Holder {
        #[allow(dead_code)]
        store: SharedStore,
    }

    #[test]
    fn shared_store_is_debug() {
        let holder = Holder {
            store: Arc::new(EmptyStore),
        };
        assert!(format!("{holder:?}").contains("DocumentStore"));
    }
}
