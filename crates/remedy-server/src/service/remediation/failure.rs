use jiff::Timestamp;
use remedy_core::types::FileResource;
use remedy_core::{Result, SharedStore};

use super::TRACING_TARGET;

/// Marks files whose remediation failed.
#[derive(Debug, Clone)]
pub struct FailureRecorder {
    store: SharedStore,
}

impl FailureRecorder {
    /// Creates a new recorder.
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Sets the failure timestamp of the file holding `correlation_id`,
    /// overwriting an earlier one.
    ///
    /// Fails with `NotFound` when no file holds the id.
    pub async fn record(&self, correlation_id: &str, reason: &str) -> Result<FileResource> {
        let file = self
            .store
            .record_failure(correlation_id, reason, Timestamp::now())
            .await?;

        tracing::warn!(
            target: TRACING_TARGET,
            file_id = %file.id,
            correlation_id = %correlation_id,
            reason = %reason,
            "Remediation failure recorded"
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use remedy_core::types::{PDF_MIME_TYPE, PublicationState};
    use remedy_core::{DocumentStore, ErrorKind};
    use remedy_test::MemoryStore;
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn overwrites_failure_timestamp() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let work = store.insert_work("Field notes", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());
        let file = store.insert_file(version.id, "a.pdf", PDF_MIME_TYPE, "aa");
        store
            .record_submission(file.id, "uuid-1", Timestamp::now())
            .await?;
        let recorder = FailureRecorder::new(Arc::new(store.clone()));

        let first = recorder.record("uuid-1", "unreadable").await?;
        let second = recorder.record("uuid-1", "unreadable again").await?;

        assert!(first.remediation.failed_at().is_some());
        assert!(second.remediation.failed_at() >= first.remediation.failed_at());
        assert_eq!(file.id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_correlation_id_is_not_found() {
        let recorder = FailureRecorder::new(Arc::new(MemoryStore::new()));
        let error = recorder
            .record(&Uuid::now_v7().to_string(), "boom")
            .await
            .expect_err("no file holds the id");
        assert_eq!(error.kind, ErrorKind::NotFound);
    }
}
