//! [`DocumentStore`] implementation backed by PostgreSQL.

use diesel_async::scoped_futures::ScopedFutureExt;
use jiff::Timestamp;
use remedy_core::types::{
    Contributor, DocumentVersion, EventType, FileResource, NewFileResource, RemediationCommit,
    RemediationOutcome, RemediationResolution, Work,
};
use remedy_core::{DocumentStore, Error, Result};
use uuid::Uuid;

use crate::model::{self, NewDocumentVersion, NewRemediationEvent, NewVersionContributor, VersionFile};
use crate::query::{
    DocumentVersionRepository, FileResourceRepository, RemediationEventRepository, WorkRepository,
};
use crate::{PgClient, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY};

/// Ledger outcome stored while a claimed event is being applied.
const PENDING_OUTCOME: &str = "pending";

/// Error raised inside a store transaction.
///
/// Keeps domain errors, such as a stale correlation id, distinct from
/// database failures so both roll the transaction back without losing
/// their kind.
#[derive(Debug)]
enum TxError {
    Database(PgError),
    Domain(Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error.into())
    }
}

impl From<PgError> for TxError {
    fn from(error: PgError) -> Self {
        Self::Database(error)
    }
}

impl From<Error> for TxError {
    fn from(error: Error) -> Self {
        Self::Domain(error)
    }
}

impl From<TxError> for Error {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Database(error) => error.into(),
            TxError::Domain(error) => error,
        }
    }
}

fn stale_correlation_id(correlation_id: &str) -> Error {
    Error::not_found().with_message(format!(
        "no file currently holds correlation id {correlation_id}"
    ))
}

async fn load_version(
    conn: &mut PgConnection,
    version: Option<model::DocumentVersion>,
) -> PgResult<Option<DocumentVersion>> {
    let Some(version) = version else {
        return Ok(None);
    };

    let contributors = conn
        .list_version_contributors(version.id)
        .await?
        .into_iter()
        .map(Contributor::from)
        .collect();

    Ok(Some(version.into_domain(contributors)))
}

/// Creates the auto-remediated successor of the work's latest published
/// version.
///
/// The work row is locked first, so concurrent results for sibling files are
/// applied one after another and each builds on the version the previous one
/// created. Returns [`RemediationOutcome::TargetMovedOn`] only when the latest
/// published version no longer carries the file.
async fn build_version(
    conn: &mut PgConnection,
    resolved_against: Uuid,
    replaced_file_id: Uuid,
    replacement: NewFileResource,
    at: Timestamp,
) -> PgResult<RemediationOutcome> {
    conn.lock_work_by_id(replacement.work_id).await?;

    let Some(base) = conn.find_latest_published_version(replacement.work_id).await? else {
        return Ok(RemediationOutcome::TargetMovedOn);
    };

    let memberships = conn.list_version_memberships(base.id).await?;
    if !memberships.iter().any(|m| m.file_id == replaced_file_id) {
        return Ok(RemediationOutcome::TargetMovedOn);
    }

    if base.id != resolved_against {
        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            resolved_against = %resolved_against,
            base_version_id = %base.id,
            "Rebasing remediated file onto newer version"
        );
    }

    let version_number = conn.next_version_number(base.work_id).await?;
    let contributors = conn.list_version_contributors(base.id).await?;
    let new_version = NewDocumentVersion::remediated_from(&base, version_number, at);
    let new_version_id = new_version.id;
    let contributors = contributors
        .iter()
        .map(|row| NewVersionContributor::copy_to(row, new_version_id))
        .collect();

    conn.create_version(new_version, contributors).await?;
    let new_file = conn.create_file(replacement.into()).await?;

    let memberships = memberships
        .into_iter()
        .map(|m| VersionFile {
            version_id: new_version_id,
            file_id: if m.file_id == replaced_file_id {
                new_file.id
            } else {
                m.file_id
            },
            position: m.position,
        })
        .collect();
    conn.attach_files(memberships).await?;
    conn.link_remediated_version(base.id, new_version_id).await?;

    Ok(RemediationOutcome::VersionCreated {
        version_id: new_version_id,
    })
}

async fn apply_commit(
    conn: &mut PgConnection,
    commit: RemediationCommit,
) -> std::result::Result<RemediationOutcome, TxError> {
    let correlation_id = commit.correlation_id.as_str();
    let event_type: &'static str = EventType::JobSucceeded.into();

    let file = conn
        .lock_file_by_correlation_id(correlation_id)
        .await?
        .ok_or_else(|| stale_correlation_id(correlation_id))?;

    let claimed = conn
        .claim_remediation_event(NewRemediationEvent {
            correlation_id: correlation_id.to_owned(),
            event_type: event_type.to_owned(),
            outcome: PENDING_OUTCOME.to_owned(),
        })
        .await?;
    if !claimed {
        return Ok(RemediationOutcome::AlreadyProcessed);
    }

    let succeeded =
        file.remediation_status()?
            .succeed(correlation_id, &commit.output_url, commit.completed_at)?;

    let outcome = match commit.resolution {
        RemediationResolution::Replace {
            base_version_id,
            replaced_file_id,
            replacement,
        } => {
            build_version(
                conn,
                base_version_id,
                replaced_file_id,
                replacement,
                commit.completed_at,
            )
            .await?
        }
        RemediationResolution::Unchanged => RemediationOutcome::Unchanged,
        RemediationResolution::TargetMovedOn => RemediationOutcome::TargetMovedOn,
    };

    conn.update_file_remediation(file.id, &succeeded).await?;
    conn.record_remediation_outcome(correlation_id, event_type, outcome.into())
        .await?;

    Ok(outcome)
}

#[async_trait::async_trait]
impl DocumentStore for PgClient {
    async fn find_work(&self, work_id: Uuid) -> Result<Option<Work>> {
        let mut conn = self.get_connection().await?;
        let work = conn.find_work_by_id(work_id).await?;
        Ok(work.map(Into::into))
    }

    async fn find_version(&self, version_id: Uuid) -> Result<Option<DocumentVersion>> {
        let mut conn = self.get_connection().await?;
        let version = conn.find_version_by_id(version_id).await?;
        Ok(load_version(&mut conn, version).await?)
    }

    async fn latest_published_version(&self, work_id: Uuid) -> Result<Option<DocumentVersion>> {
        let mut conn = self.get_connection().await?;
        let version = conn.find_latest_published_version(work_id).await?;
        Ok(load_version(&mut conn, version).await?)
    }

    async fn list_version_files(&self, version_id: Uuid) -> Result<Vec<FileResource>> {
        let mut conn = self.get_connection().await?;
        let files = conn
            .list_version_files(version_id)
            .await?
            .into_iter()
            .map(model::FileResource::into_domain)
            .collect::<PgResult<Vec<_>>>()?;
        Ok(files)
    }

    async fn find_file(&self, file_id: Uuid) -> Result<Option<FileResource>> {
        let mut conn = self.get_connection().await?;
        let file = conn.find_file_by_id(file_id).await?;
        Ok(file.map(model::FileResource::into_domain).transpose()?)
    }

    async fn find_file_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> Result<Option<FileResource>> {
        let mut conn = self.get_connection().await?;
        let file = conn.find_file_by_correlation_id(correlation_id).await?;
        Ok(file.map(model::FileResource::into_domain).transpose()?)
    }

    async fn mark_remediation_started(&self, version_id: Uuid, at: Timestamp) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        conn.mark_remediation_started(version_id, at)
            .await?
            .ok_or_else(|| {
                Error::not_found().with_message(format!("version {version_id} does not exist"))
            })
    }

    async fn record_submission(
        &self,
        file_id: Uuid,
        correlation_id: &str,
        at: Timestamp,
    ) -> Result<FileResource> {
        let correlation_id = correlation_id.to_owned();
        let mut conn = self.get_connection().await?;

        let file = conn
            .transaction(move |conn| {
                async move {
                    let file = conn.lock_file_by_id(file_id).await?.ok_or_else(|| {
                        Error::not_found().with_message(format!("file {file_id} does not exist"))
                    })?;
                    let submitted = file.remediation_status()?.submit(correlation_id, at)?;
                    let file = conn.update_file_remediation(file_id, &submitted).await?;
                    Ok::<_, TxError>(file)
                }
                .scope_boxed()
            })
            .await?;

        Ok(file.into_domain()?)
    }

    async fn record_failure(
        &self,
        correlation_id: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<FileResource> {
        let correlation_id = correlation_id.to_owned();
        let reason = reason.to_owned();
        let mut conn = self.get_connection().await?;

        let file = conn
            .transaction(move |conn| {
                async move {
                    let file = conn
                        .lock_file_by_correlation_id(&correlation_id)
                        .await?
                        .ok_or_else(|| stale_correlation_id(&correlation_id))?;
                    let failed = file
                        .remediation_status()?
                        .fail(&correlation_id, reason, at)?;
                    let file = conn.update_file_remediation(file.id, &failed).await?;
                    Ok::<_, TxError>(file)
                }
                .scope_boxed()
            })
            .await?;

        Ok(file.into_domain()?)
    }

    async fn is_event_processed(
        &self,
        correlation_id: &str,
        event_type: EventType,
    ) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let processed = conn
            .is_remediation_event_processed(correlation_id, event_type.as_ref())
            .await?;
        Ok(processed)
    }

    async fn commit_remediation(&self, commit: RemediationCommit) -> Result<RemediationOutcome> {
        let correlation_id = commit.correlation_id.clone();
        let mut conn = self.get_connection().await?;

        let outcome = conn
            .transaction(move |conn| apply_commit(conn, commit).scope_boxed())
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            correlation_id = %correlation_id,
            outcome = %outcome,
            "Remediation result committed"
        );

        Ok(outcome)
    }
}
