//! Store wrapper that lets concurrent commits interleave.

use jiff::Timestamp;
use remedy_core::types::{
    DocumentVersion, EventType, FileResource, RemediationCommit, RemediationOutcome, Work,
};
use remedy_core::{DocumentStore, Result};
use uuid::Uuid;

use super::MemoryStore;

/// [`MemoryStore`] that yields to the runtime before each
/// `commit_remediation`.
///
/// Two tasks joined on the same runtime thread both finish their reads
/// before either commits, which reproduces concurrent queue workers.
#[derive(Debug, Default, Clone)]
pub struct InterleavingStore {
    inner: MemoryStore,
}

impl InterleavingStore {
    /// Wraps `store`; clones share its state.
    pub fn new(store: MemoryStore) -> Self {
        Self { inner: store }
    }
}

#[async_trait::async_trait]
impl DocumentStore for InterleavingStore {
    async fn find_work(&self, work_id: Uuid) -> Result<Option<Work>> {
        self.inner.find_work(work_id).await
    }

    async fn find_version(&self, version_id: Uuid) -> Result<Option<DocumentVersion>> {
        self.inner.find_version(version_id).await
    }

    async fn latest_published_version(&self, work_id: Uuid) -> Result<Option<DocumentVersion>> {
        self.inner.latest_published_version(work_id).await
    }

    async fn list_version_files(&self, version_id: Uuid) -> Result<Vec<FileResource>> {
        self.inner.list_version_files(version_id).await
    }

    async fn find_file(&self, file_id: Uuid) -> Result<Option<FileResource>> {
        self.inner.find_file(file_id).await
    }

    async fn find_file_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> Result<Option<FileResource>> {
        self.inner.find_file_by_correlation_id(correlation_id).await
    }

    async fn mark_remediation_started(&self, version_id: Uuid, at: Timestamp) -> Result<bool> {
        self.inner.mark_remediation_started(version_id, at).await
    }

    async fn record_submission(
        &self,
        file_id: Uuid,
        correlation_id: &str,
        at: Timestamp,
    ) -> Result<FileResource> {
        self.inner.record_submission(file_id, correlation_id, at).await
    }

    async fn record_failure(
        &self,
        correlation_id: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<FileResource> {
        self.inner.record_failure(correlation_id, reason, at).await
    }

    async fn is_event_processed(
        &self,
        correlation_id: &str,
        event_type: EventType,
    ) -> Result<bool> {
        self.inner.is_event_processed(correlation_id, event_type).await
    }

    async fn commit_remediation(&self, commit: RemediationCommit) -> Result<RemediationOutcome> {
        tokio::task::yield_now().await;
        self.inner.commit_remediation(commit).await
    }
}
