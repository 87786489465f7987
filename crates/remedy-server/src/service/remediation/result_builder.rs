use jiff::Timestamp;
use remedy_core::artifact::ArtifactStore;
use remedy_core::queue::TaskQueue;
use remedy_core::remediation::RemediationService;
use remedy_core::types::{
    DocumentVersion, EventType, FileFingerprint, FileResource, NewFileResource, PDF_MIME_TYPE,
    RemediationCommit, RemediationOutcome, RemediationResolution, RemediationTask,
    VersionContent,
};
use remedy_core::{Error, Result, SharedStore};
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use super::TRACING_TARGET;

/// Turns a successful remediation job into a new published version.
#[derive(Debug, Clone)]
pub struct ResultBuilder {
    store: SharedStore,
    remediation: RemediationService,
    artifacts: ArtifactStore,
    queue: TaskQueue,
}

impl ResultBuilder {
    /// Creates a new result builder.
    pub fn new(
        store: SharedStore,
        remediation: RemediationService,
        artifacts: ArtifactStore,
        queue: TaskQueue,
    ) -> Self {
        Self {
            store,
            remediation,
            artifacts,
            queue,
        }
    }

    /// Applies the result of job `correlation_id`.
    ///
    /// The file currently holding the id is replaced by the artifact at
    /// `output_url` in a copy of the work's latest published version that
    /// still contains it. The store commits the new version and the
    /// processed-event ledger entry together, so a redelivered event yields
    /// [`RemediationOutcome::AlreadyProcessed`] instead of a second version.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when no file holds the correlation id, either
    /// because it never existed or because a later submission superseded it.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(correlation_id = %correlation_id))]
    pub async fn build(&self, correlation_id: &str, output_url: &str) -> Result<RemediationOutcome> {
        let file = self
            .store
            .find_file_by_correlation_id(correlation_id)
            .await?
            .ok_or_else(|| {
                Error::not_found().with_message(format!(
                    "no file currently holds correlation id {correlation_id}"
                ))
            })?;

        if self
            .store
            .is_event_processed(correlation_id, EventType::JobSucceeded)
            .await?
        {
            tracing::info!(target: TRACING_TARGET, file_id = %file.id, "Success event already applied");
            return Ok(RemediationOutcome::AlreadyProcessed);
        }

        let resolution = match self.base_version(&file).await? {
            Some((base, files)) => self.resolve(&file, &base, &files, output_url).await?,
            None => RemediationResolution::TargetMovedOn,
        };

        let stored_key = match &resolution {
            RemediationResolution::Replace { replacement, .. } => Some(replacement.id.to_string()),
            _ => None,
        };

        let committed = self
            .store
            .commit_remediation(RemediationCommit {
                correlation_id: correlation_id.to_owned(),
                output_url: output_url.to_owned(),
                completed_at: Timestamp::now(),
                resolution,
            })
            .await;

        // Only a created version references the uploaded artifact.
        if let Some(key) = stored_key.as_deref()
            && !matches!(committed, Ok(RemediationOutcome::VersionCreated { .. }))
        {
            self.discard_artifact(key).await;
        }

        let outcome = committed?;

        match outcome {
            RemediationOutcome::VersionCreated { version_id } => {
                tracing::info!(
                    target: TRACING_TARGET,
                    file_id = %file.id,
                    version_id = %version_id,
                    "Auto-remediated version published"
                );

                // The ledger entry is committed; a retry would only see
                // AlreadyProcessed, so a lost notification is logged instead.
                if let Err(error) = self
                    .queue
                    .enqueue(RemediationTask::NotifyRemediated { version_id })
                    .await
                {
                    tracing::error!(
                        target: TRACING_TARGET,
                        version_id = %version_id,
                        error = %error,
                        "Failed to schedule remediation notification"
                    );
                }
            }
            RemediationOutcome::TargetMovedOn => tracing::warn!(
                target: TRACING_TARGET,
                file_id = %file.id,
                work_id = %file.work_id,
                "Work moved on since submission, artifact not applied"
            ),
            other => tracing::info!(
                target: TRACING_TARGET,
                file_id = %file.id,
                outcome = %other,
                "Remediation result applied without a new version"
            ),
        }

        Ok(outcome)
    }

    async fn discard_artifact(&self, key: &str) {
        if let Err(error) = self.artifacts.delete(key).await {
            tracing::warn!(
                target: TRACING_TARGET,
                key = %key,
                error = %error,
                "Orphaned artifact left in bucket"
            );
        }
    }

    /// The work's latest published version, if it still contains `file`.
    async fn base_version(
        &self,
        file: &FileResource,
    ) -> Result<Option<(DocumentVersion, Vec<FileResource>)>> {
        let Some(latest) = self.store.latest_published_version(file.work_id).await? else {
            return Ok(None);
        };

        let files = self.store.list_version_files(latest.id).await?;
        if !files.iter().any(|f| f.id == file.id) {
            return Ok(None);
        }

        Ok(Some((latest, files)))
    }

    async fn resolve(
        &self,
        file: &FileResource,
        base: &DocumentVersion,
        files: &[FileResource],
        output_url: &str,
    ) -> Result<RemediationResolution> {
        let output_url = Url::parse(output_url).map_err(|e| {
            Error::invalid_input()
                .with_message(format!("invalid output url {output_url}"))
                .with_source(e)
        })?;

        let artifact = self.remediation.fetch_artifact(&output_url).await?;
        let sha256 = hex::encode(Sha256::digest(&artifact.content));

        let predecessor = VersionContent::capture(base, files);
        let candidate = predecessor.clone().with_replaced_file(
            &FileFingerprint::from(file),
            FileFingerprint {
                filename: file.filename.clone(),
                sha256: sha256.clone(),
            },
        );

        if !candidate.differs_from(&predecessor) {
            return Ok(RemediationResolution::Unchanged);
        }

        let id = Uuid::now_v7();
        let stored = self.artifacts.put(&id.to_string(), artifact.content).await?;
        let size_bytes = i64::try_from(stored.size).map_err(|_| {
            Error::invalid_input().with_message(format!("artifact of {} bytes is too large", stored.size))
        })?;

        Ok(RemediationResolution::Replace {
            base_version_id: base.id,
            replaced_file_id: file.id,
            replacement: NewFileResource {
                id,
                work_id: file.work_id,
                filename: file.filename.clone(),
                mime_type: PDF_MIME_TYPE.to_owned(),
                sha256,
                size_bytes,
                storage_key: stored.storage_key,
                remediated_from_id: Some(file.id),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use remedy_core::types::{Contributor, PublicationState, RemediationState};
    use remedy_core::{DocumentStore, ErrorKind};
    use remedy_test::{
        InterleavingStore, MemoryArtifacts, MemoryStore, MockRemediation, RecordingQueue,
    };

    use super::*;

    const OUTPUT_URL: &str = "https://example.com/out.pdf";

    struct Fixture {
        store: MemoryStore,
        remediation: MockRemediation,
        artifacts: MemoryArtifacts,
        queue: RecordingQueue,
        builder: ResultBuilder,
    }

    fn fixture(remediation: MockRemediation) -> Fixture {
        let store = MemoryStore::new();
        fixture_over(store.clone(), Arc::new(store), remediation)
    }

    /// Commits of concurrently joined builds interleave.
    fn interleaved_fixture() -> Fixture {
        let store = MemoryStore::new();
        let shared = Arc::new(InterleavingStore::new(store.clone()));
        fixture_over(store, shared, MockRemediation::new())
    }

    fn fixture_over(
        store: MemoryStore,
        shared: SharedStore,
        remediation: MockRemediation,
    ) -> Fixture {
        let artifacts = MemoryArtifacts::new();
        let queue = RecordingQueue::new();
        let builder = ResultBuilder::new(
            shared,
            RemediationService::new(remediation.clone()),
            ArtifactStore::new(artifacts.clone()),
            TaskQueue::new(queue.clone()),
        );
        Fixture {
            store,
            remediation,
            artifacts,
            queue,
            builder,
        }
    }

    fn published(store: &MemoryStore) -> DocumentVersion {
        let work = store.insert_work("Field notes", Some("depositor@example.com"));
        store.insert_version(
            work.id,
            PublicationState::Published,
            vec![Contributor::new("Ada", Some("ada@example.com".to_owned()))],
        )
    }

    async fn submit(store: &MemoryStore, file_id: Uuid, correlation_id: &str) -> Result<()> {
        store
            .record_submission(file_id, correlation_id, Timestamp::now())
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn success_publishes_new_version_with_artifact() -> anyhow::Result<()> {
        let f = fixture(MockRemediation::new());
        let source = published(&f.store);
        let pdf = f.store.insert_file(source.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        let csv = f.store.insert_file(source.id, "data.csv", "text/csv", "cc");
        submit(&f.store, pdf.id, "uuid-2").await?;

        let outcome = f.builder.build("uuid-2", OUTPUT_URL).await?;
        let version_id = outcome.version_id().expect("version created");

        let created = f.store.version(version_id).expect("version exists");
        assert!(created.is_auto_remediated);
        assert!(created.is_published());
        assert_eq!(created.metadata, source.metadata);
        assert_eq!(created.contributors, source.contributors);

        let members = f.store.members(version_id);
        assert_eq!(members.len(), 2);
        assert_eq!(members[1], csv.id);
        let artifact = f.store.file(members[0]).expect("artifact file exists");
        assert_eq!(artifact.remediated_from_id, Some(pdf.id));
        assert_eq!(artifact.filename, "thesis.pdf");
        assert!(f.artifacts.get(&artifact.id.to_string()).is_some());

        assert_eq!(f.remediation.downloads()[0].as_str(), OUTPUT_URL);
        assert_eq!(
            f.store.file(pdf.id).map(|f| f.remediation.state()),
            Some(RemediationState::Succeeded)
        );
        assert_eq!(
            f.store.version(source.id).and_then(|v| v.remediated_version_id),
            Some(version_id)
        );
        assert_eq!(
            f.queue.tasks(),
            vec![RemediationTask::NotifyRemediated { version_id }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_delivery_builds_one_version() -> anyhow::Result<()> {
        let f = fixture(MockRemediation::new());
        let source = published(&f.store);
        let pdf = f.store.insert_file(source.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        submit(&f.store, pdf.id, "uuid-2").await?;

        let first = f.builder.build("uuid-2", OUTPUT_URL).await?;
        let second = f.builder.build("uuid-2", OUTPUT_URL).await?;

        assert!(matches!(first, RemediationOutcome::VersionCreated { .. }));
        assert_eq!(second, RemediationOutcome::AlreadyProcessed);
        assert_eq!(f.store.versions_of(source.work_id).len(), 2);
        assert_eq!(f.queue.tasks().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_duplicate_delivery_builds_one_version() -> anyhow::Result<()> {
        let f = interleaved_fixture();
        let source = published(&f.store);
        let pdf = f.store.insert_file(source.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        submit(&f.store, pdf.id, "uuid-2").await?;

        let (first, second) = tokio::join!(
            f.builder.build("uuid-2", OUTPUT_URL),
            f.builder.build("uuid-2", OUTPUT_URL),
        );
        let mut outcomes = [first?, second?];
        outcomes.sort_by_key(|o| o.version_id().is_none());

        assert!(matches!(outcomes[0], RemediationOutcome::VersionCreated { .. }));
        assert_eq!(outcomes[1], RemediationOutcome::AlreadyProcessed);
        assert_eq!(f.remediation.downloads().len(), 2);
        assert_eq!(f.store.versions_of(source.work_id).len(), 2);
        assert_eq!(f.queue.tasks().len(), 1);
        assert_eq!(f.artifacts.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_sibling_results_land_in_one_lineage() -> anyhow::Result<()> {
        let f = interleaved_fixture();
        let source = published(&f.store);
        let first = f.store.insert_file(source.id, "a.pdf", PDF_MIME_TYPE, "aa");
        let second = f.store.insert_file(source.id, "b.pdf", PDF_MIME_TYPE, "bb");
        submit(&f.store, first.id, "uuid-1").await?;
        submit(&f.store, second.id, "uuid-2").await?;

        let (a, b) = tokio::join!(
            f.builder.build("uuid-1", OUTPUT_URL),
            f.builder.build("uuid-2", OUTPUT_URL),
        );
        assert!(a?.version_id().is_some());
        assert!(b?.version_id().is_some());

        let versions = f.store.versions_of(source.work_id);
        assert_eq!(versions.len(), 3);
        let latest = versions.last().map(|v| v.id).expect("latest version");
        let files = f.store.list_version_files(latest).await?;
        let names: Vec<_> = files.iter().map(|file| file.filename.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
        assert!(files.iter().all(FileResource::is_remediated_artifact));
        assert_eq!(f.artifacts.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn superseded_correlation_id_is_not_found() -> anyhow::Result<()> {
        let f = fixture(MockRemediation::new());
        let source = published(&f.store);
        let pdf = f.store.insert_file(source.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        submit(&f.store, pdf.id, "uuid-1").await?;
        submit(&f.store, pdf.id, "uuid-2").await?;

        let error = f
            .builder
            .build("uuid-1", OUTPUT_URL)
            .await
            .expect_err("uuid-1 was superseded");

        assert_eq!(error.kind, ErrorKind::NotFound);
        assert!(!error.is_retryable());
        assert_eq!(f.store.versions_of(source.work_id).len(), 1);
        assert!(f.remediation.downloads().is_empty());
        assert!(
            f.store
                .file(pdf.id)
                .is_some_and(|f| f.remediation.live_correlation_id() == Some("uuid-2"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn identical_artifact_is_rejected_as_unchanged() -> anyhow::Result<()> {
        let content = b"%PDF-1.7 already accessible".to_vec();
        let sha256 = hex::encode(Sha256::digest(&content));
        let f = fixture(MockRemediation::new().with_artifact(content));
        let source = published(&f.store);
        let pdf = f.store.insert_file(source.id, "thesis.pdf", PDF_MIME_TYPE, &sha256);
        submit(&f.store, pdf.id, "uuid-3").await?;

        let outcome = f.builder.build("uuid-3", OUTPUT_URL).await?;

        assert_eq!(outcome, RemediationOutcome::Unchanged);
        assert_eq!(f.store.versions_of(source.work_id).len(), 1);
        assert!(f.artifacts.is_empty());
        assert!(f.queue.tasks().is_empty());
        assert_eq!(
            f.store.file(pdf.id).map(|f| f.remediation.state()),
            Some(RemediationState::Succeeded)
        );
        Ok(())
    }

    #[tokio::test]
    async fn replaced_file_means_target_moved_on() -> anyhow::Result<()> {
        let f = fixture(MockRemediation::new());
        let source = published(&f.store);
        let pdf = f.store.insert_file(source.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        submit(&f.store, pdf.id, "uuid-4").await?;

        let newer = f
            .store
            .insert_version(source.work_id, PublicationState::Published, Vec::new());
        f.store.insert_file(newer.id, "thesis-v2.pdf", PDF_MIME_TYPE, "bb");

        let outcome = f.builder.build("uuid-4", OUTPUT_URL).await?;

        assert_eq!(outcome, RemediationOutcome::TargetMovedOn);
        assert_eq!(f.store.versions_of(source.work_id).len(), 2);
        assert!(f.queue.tasks().is_empty());
        assert!(f.remediation.downloads().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn sibling_results_accumulate_in_latest_version() -> anyhow::Result<()> {
        let f = fixture(MockRemediation::new());
        let source = published(&f.store);
        let first = f.store.insert_file(source.id, "a.pdf", PDF_MIME_TYPE, "aa");
        let second = f.store.insert_file(source.id, "b.pdf", PDF_MIME_TYPE, "bb");
        submit(&f.store, first.id, "uuid-1").await?;
        submit(&f.store, second.id, "uuid-2").await?;

        f.builder.build("uuid-1", OUTPUT_URL).await?;
        let outcome = f.builder.build("uuid-2", OUTPUT_URL).await?;
        let latest = outcome.version_id().expect("second version created");

        let files = f.store.list_version_files(latest).await?;
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(FileResource::is_remediated_artifact));
        assert_eq!(f.store.versions_of(source.work_id).len(), 3);
        Ok(())
    }
}
