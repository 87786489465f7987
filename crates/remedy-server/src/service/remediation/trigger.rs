use jiff::Timestamp;
use remedy_core::queue::TaskQueue;
use remedy_core::types::{ActorRole, RemediationTask};
use remedy_core::{Error, Result, SharedStore};
use uuid::Uuid;

use super::{EligibilityCheck, Ineligibility, TRACING_TARGET};
use crate::service::RemediationSettings;

/// A download that may start auto-remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Downloaded version.
    pub version_id: Uuid,
    /// Role of the downloading actor.
    pub actor_role: ActorRole,
    /// Whether the download path can trigger remediation.
    pub remediation_capable: bool,
}

/// What a download did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Submission of the version was enqueued.
    Scheduled,
    /// The version does not qualify.
    Ineligible,
    /// Remediation was already started, possibly by a concurrent download.
    AlreadyStarted,
}

/// Evaluates downloads and starts auto-remediation once per version.
#[derive(Debug, Clone)]
pub struct RemediationTrigger {
    store: SharedStore,
    queue: TaskQueue,
    settings: RemediationSettings,
}

impl RemediationTrigger {
    /// Creates a new trigger.
    pub fn new(store: SharedStore, queue: TaskQueue, settings: RemediationSettings) -> Self {
        Self {
            store,
            queue,
            settings,
        }
    }

    /// Applies the eligibility gate, claims the version and enqueues its
    /// submission.
    ///
    /// Only the caller that sets `auto_remediation_started_at` enqueues a task.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET,
        fields(version_id = %request.version_id, actor_role = %request.actor_role)
    )]
    pub async fn on_download(&self, request: DownloadRequest) -> Result<TriggerOutcome> {
        let version = self
            .store
            .find_version(request.version_id)
            .await?
            .ok_or_else(|| {
                Error::not_found()
                    .with_message(format!("version {} does not exist", request.version_id))
            })?;

        let work = self.store.find_work(version.work_id).await?.ok_or_else(|| {
            Error::not_found().with_message(format!("work {} does not exist", version.work_id))
        })?;

        let latest = self.store.latest_published_version(work.id).await?;
        let check = EligibilityCheck {
            auto_remediation_enabled: self.settings.auto_remediation_enabled(),
            version: &version,
            work: &work,
            latest_published_id: latest.map(|v| v.id),
            actor_role: request.actor_role,
            remediation_capable: request.remediation_capable,
        };

        match check.evaluate() {
            None => {}
            Some(Ineligibility::AlreadyStarted) => return Ok(TriggerOutcome::AlreadyStarted),
            Some(reason) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    reason = %reason,
                    "Version is not eligible for auto-remediation"
                );
                return Ok(TriggerOutcome::Ineligible);
            }
        }

        if !self
            .store
            .mark_remediation_started(version.id, Timestamp::now())
            .await?
        {
            tracing::debug!(
                target: TRACING_TARGET,
                "Lost the race to start auto-remediation"
            );
            return Ok(TriggerOutcome::AlreadyStarted);
        }

        self.queue
            .enqueue(RemediationTask::SubmitVersion {
                version_id: version.id,
            })
            .await?;

        tracing::info!(target: TRACING_TARGET, "Auto-remediation scheduled");
        Ok(TriggerOutcome::Scheduled)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use remedy_core::ErrorKind;
    use remedy_core::types::{Contributor, PublicationState};
    use remedy_test::{MemoryStore, RecordingQueue};
    use url::Url;

    use super::*;
    use crate::extract::ApiKey;

    fn trigger(store: &MemoryStore, queue: &RecordingQueue, enabled: bool) -> RemediationTrigger {
        let settings = RemediationSettings::new(
            Url::parse("https://repo.example.com").expect("valid url"),
            ApiKey::new("webhook"),
            ApiKey::new("internal"),
        )
        .with_auto_remediation(enabled);
        RemediationTrigger::new(
            Arc::new(store.clone()),
            TaskQueue::new(queue.clone()),
            settings,
        )
    }

    fn download(version_id: Uuid) -> DownloadRequest {
        DownloadRequest {
            version_id,
            actor_role: ActorRole::Anonymous,
            remediation_capable: true,
        }
    }

    #[tokio::test]
    async fn first_download_schedules_once() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let queue = RecordingQueue::new();
        let work = store.insert_work("Reading rooms", None);
        let version = store.insert_version(
            work.id,
            PublicationState::Published,
            vec![Contributor::new("Ada", None)],
        );
        let trigger = trigger(&store, &queue, true);

        let first = trigger.on_download(download(version.id)).await?;
        let second = trigger.on_download(download(version.id)).await?;

        assert_eq!(first, TriggerOutcome::Scheduled);
        assert_eq!(second, TriggerOutcome::AlreadyStarted);
        assert_eq!(
            queue.tasks(),
            vec![RemediationTask::SubmitVersion {
                version_id: version.id
            }]
        );
        assert!(store.version(version.id).is_some_and(|v| v.has_remediation_started()));
        Ok(())
    }

    #[tokio::test]
    async fn ineligible_download_has_no_side_effects() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let queue = RecordingQueue::new();
        let work = store.insert_work("Reading rooms", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());

        let outcome = trigger(&store, &queue, false)
            .on_download(download(version.id))
            .await?;

        assert_eq!(outcome, TriggerOutcome::Ineligible);
        assert!(queue.tasks().is_empty());
        assert!(store.version(version.id).is_some_and(|v| !v.has_remediation_started()));
        Ok(())
    }

    #[tokio::test]
    async fn older_published_version_is_ineligible() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let queue = RecordingQueue::new();
        let work = store.insert_work("Reading rooms", None);
        let older = store.insert_version(work.id, PublicationState::Published, Vec::new());
        store.insert_version(work.id, PublicationState::Published, Vec::new());

        let outcome = trigger(&store, &queue, true)
            .on_download(download(older.id))
            .await?;
        assert_eq!(outcome, TriggerOutcome::Ineligible);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_version_is_not_found() {
        let store = MemoryStore::new();
        let queue = RecordingQueue::new();

        let error = trigger(&store, &queue, true)
            .on_download(download(Uuid::now_v7()))
            .await
            .expect_err("version does not exist");
        assert_eq!(error.kind, ErrorKind::NotFound);
    }
}
