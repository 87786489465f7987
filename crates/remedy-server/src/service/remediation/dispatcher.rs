use jiff::Timestamp;
use remedy_core::remediation::{RemediationService, SubmissionRequest};
use remedy_core::types::{FileResource, RemediationStatus};
use remedy_core::{Error, Result, SharedStore};
use uuid::Uuid;

use super::TRACING_TARGET;
use crate::service::RemediationSettings;

/// Files a dispatch run submitted and skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Files sent to the remediation service.
    pub submitted: usize,
    /// Files that do not qualify or already have a job.
    pub skipped: usize,
}

/// Submits PDF files to the remediation service.
#[derive(Debug, Clone)]
pub struct SubmissionDispatcher {
    store: SharedStore,
    remediation: RemediationService,
    settings: RemediationSettings,
}

impl SubmissionDispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        store: SharedStore,
        remediation: RemediationService,
        settings: RemediationSettings,
    ) -> Self {
        Self {
            store,
            remediation,
            settings,
        }
    }

    /// Returns whether a file is submitted by [`dispatch_version`].
    ///
    /// Only original PDFs that were never submitted qualify; failed files
    /// wait for an operator.
    ///
    /// [`dispatch_version`]: Self::dispatch_version
    pub fn qualifies(file: &FileResource) -> bool {
        file.is_pdf()
            && !file.is_remediated_artifact()
            && file.remediation == RemediationStatus::NotStarted
    }

    /// Submits every qualifying file of a version.
    ///
    /// Stops at the first failed submission. Files submitted before it keep
    /// their correlation id, so running the task again submits only the rest.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(version_id = %version_id))]
    pub async fn dispatch_version(&self, version_id: Uuid) -> Result<DispatchSummary> {
        if self.store.find_version(version_id).await?.is_none() {
            return Err(
                Error::not_found().with_message(format!("version {version_id} does not exist"))
            );
        }

        let mut summary = DispatchSummary::default();
        for file in self.store.list_version_files(version_id).await? {
            if !Self::qualifies(&file) {
                summary.skipped += 1;
                continue;
            }

            self.submit(&file).await?;
            summary.submitted += 1;
        }

        tracing::info!(
            target: TRACING_TARGET,
            submitted = summary.submitted,
            skipped = summary.skipped,
            "Version dispatched"
        );
        Ok(summary)
    }

    /// Submits one file again, superseding any earlier job.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(file_id = %file_id))]
    pub async fn resubmit_file(&self, file_id: Uuid) -> Result<String> {
        let file = self.store.find_file(file_id).await?.ok_or_else(|| {
            Error::not_found().with_message(format!("file {file_id} does not exist"))
        })?;

        if !file.is_pdf() {
            return Err(Error::invalid_input()
                .with_message(format!("file {file_id} is not a PDF ({})", file.mime_type)));
        }

        if let Some(previous) = file.remediation.current_correlation_id() {
            tracing::info!(
                target: TRACING_TARGET,
                previous_correlation_id = %previous,
                state = %file.remediation.state(),
                "Superseding earlier remediation job"
            );
        }

        self.submit(&file).await
    }

    async fn submit(&self, file: &FileResource) -> Result<String> {
        let source_url = self.settings.file_url(file.id)?;
        let receipt = self
            .remediation
            .submit(&SubmissionRequest::new(source_url))
            .await?;

        self.store
            .record_submission(file.id, &receipt.correlation_id, Timestamp::now())
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            file_id = %file.id,
            correlation_id = %receipt.correlation_id,
            "File submitted for remediation"
        );
        Ok(receipt.correlation_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use remedy_core::ErrorKind;
    use remedy_core::types::{PDF_MIME_TYPE, PublicationState};
    use remedy_test::{MemoryStore, MockRemediation};
    use url::Url;

    use super::*;
    use crate::extract::ApiKey;

    fn dispatcher(store: &MemoryStore, remediation: &MockRemediation) -> SubmissionDispatcher {
        let settings = RemediationSettings::new(
            Url::parse("https://repo.example.com").expect("valid url"),
            ApiKey::new("webhook"),
            ApiKey::new("internal"),
        );
        SubmissionDispatcher::new(
            Arc::new(store.clone()),
            RemediationService::new(remediation.clone()),
            settings,
        )
    }

    #[tokio::test]
    async fn submits_only_pdfs_exactly_once() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let remediation = MockRemediation::new();
        let work = store.insert_work("Field notes", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());
        let first = store.insert_file(version.id, "a.pdf", PDF_MIME_TYPE, "aa");
        let second = store.insert_file(version.id, "b.pdf", "application/pdf; version=1.7", "bb");
        let csv = store.insert_file(version.id, "data.csv", "text/csv", "cc");
        let dispatcher = dispatcher(&store, &remediation);

        let summary = dispatcher.dispatch_version(version.id).await?;
        assert_eq!(summary, DispatchSummary { submitted: 2, skipped: 1 });

        let again = dispatcher.dispatch_version(version.id).await?;
        assert_eq!(again, DispatchSummary { submitted: 0, skipped: 3 });
        assert_eq!(remediation.submissions().len(), 2);

        let expected = format!("https://repo.example.com/files/{}", first.id);
        assert_eq!(remediation.submissions()[0].as_str(), expected);

        let live = |id| store.file(id).and_then(|f| f.remediation.live_correlation_id().map(str::to_owned));
        assert_eq!(live(first.id).as_deref(), Some("uuid-1"));
        assert_eq!(live(second.id).as_deref(), Some("uuid-2"));
        assert_eq!(store.file(csv.id).map(|f| f.remediation), Some(RemediationStatus::NotStarted));
        Ok(())
    }

    #[tokio::test]
    async fn failed_submission_propagates() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let remediation = MockRemediation::new();
        remediation.set_failure(Some(ErrorKind::Authentication));
        let work = store.insert_work("Field notes", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());
        let file = store.insert_file(version.id, "a.pdf", PDF_MIME_TYPE, "aa");

        let error = dispatcher(&store, &remediation)
            .dispatch_version(version.id)
            .await
            .expect_err("credentials are rejected");

        assert_eq!(error.kind, ErrorKind::Authentication);
        assert!(!error.is_retryable());
        assert_eq!(store.file(file.id).map(|f| f.remediation), Some(RemediationStatus::NotStarted));
        Ok(())
    }

    #[tokio::test]
    async fn resubmission_supersedes_previous_job() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let remediation = MockRemediation::new();
        let work = store.insert_work("Field notes", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());
        let file = store.insert_file(version.id, "a.pdf", PDF_MIME_TYPE, "aa");
        let dispatcher = dispatcher(&store, &remediation);

        dispatcher.dispatch_version(version.id).await?;
        let correlation_id = dispatcher.resubmit_file(file.id).await?;

        assert_eq!(correlation_id, "uuid-2");
        let current = store.file(file.id).map(|f| f.remediation);
        assert!(current.as_ref().is_some_and(|s| s.holds("uuid-2")));
        assert!(current.as_ref().is_some_and(|s| !s.holds("uuid-1")));
        Ok(())
    }

    #[tokio::test]
    async fn resubmission_rejects_non_pdf() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let remediation = MockRemediation::new();
        let work = store.insert_work("Field notes", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());
        let csv = store.insert_file(version.id, "data.csv", "text/csv", "cc");

        let error = dispatcher(&store, &remediation)
            .resubmit_file(csv.id)
            .await
            .expect_err("not a pdf");
        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(remediation.submissions().is_empty());
        Ok(())
    }
}
