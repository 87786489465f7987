//! Internal remediation API used by the repository frontend and operators.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use crate::extract::{Json, Path};
use crate::handler::Result;
use crate::handler::request::{DownloadEvent, FilePathParams};
use crate::handler::response::{DownloadStatus, DownloadTrigger, Resubmission};
use crate::service::{RemediationTrigger, ServiceState, SubmissionDispatcher};

/// Tracing target for remediation API operations.
const TRACING_TARGET: &str = "remedy_server::handler::remediation";

/// Evaluates a download and schedules remediation of the version.
///
/// Returns `202` when submission was scheduled, `200` otherwise.
#[tracing::instrument(
    skip_all,
    fields(
        version_id = %request.version_id,
        actor_role = %request.actor_role,
    )
)]
async fn trigger_download(
    State(trigger): State<RemediationTrigger>,
    Json(request): Json<DownloadEvent>,
) -> Result<(StatusCode, Json<DownloadTrigger>)> {
    tracing::debug!(target: TRACING_TARGET, "Download reported");

    let outcome = trigger.on_download(request.into_request()).await?;
    let response = DownloadTrigger::from(outcome);
    let status = match response.status {
        DownloadStatus::Scheduled => StatusCode::ACCEPTED,
        DownloadStatus::Ineligible | DownloadStatus::AlreadyStarted => StatusCode::OK,
    };

    tracing::info!(
        target: TRACING_TARGET,
        status = %response.status,
        "Download evaluated"
    );

    Ok((status, Json(response)))
}

/// Submits a file again, superseding its current job.
#[tracing::instrument(skip_all, fields(file_id = %path_params.file_id))]
async fn resubmit_file(
    State(dispatcher): State<SubmissionDispatcher>,
    Path(path_params): Path<FilePathParams>,
) -> Result<Json<Resubmission>> {
    tracing::debug!(target: TRACING_TARGET, "Resubmitting file");

    let correlation_id = dispatcher.resubmit_file(path_params.file_id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        correlation_id = %correlation_id,
        "File resubmitted"
    );

    Ok(Json(Resubmission { correlation_id }))
}

/// Returns a [`Router`] with the internal remediation routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/api/remediation/downloads", post(trigger_download))
        .route(
            "/api/remediation/files/{file_id}/resubmissions",
            post(resubmit_file),
        )
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue};
    use remedy_core::queue::RemediationTask;
    use remedy_core::types::{ActorRole, RemediationState};
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;
    use crate::handler::test::create_test_server;
    use crate::service::testing::{Harness, INTERNAL_KEY};

    fn internal_key() -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static(INTERNAL_KEY),
        )
    }

    fn download(version_id: Uuid, actor_role: ActorRole) -> DownloadEvent {
        DownloadEvent {
            version_id,
            actor_role,
            remediation_capable: true,
        }
    }

    #[tokio::test]
    async fn first_download_schedules_submission() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let (version, _) = harness.published_pdf();
        let server = create_test_server(&harness)?;

        let (name, value) = internal_key();
        let first = server
            .post("/api/remediation/downloads")
            .add_header(name, value)
            .json(&download(version.id, ActorRole::User))
            .await;
        first.assert_status(StatusCode::ACCEPTED);
        assert_eq!(
            first.json::<DownloadTrigger>().status,
            DownloadStatus::Scheduled
        );

        let (name, value) = internal_key();
        let second = server
            .post("/api/remediation/downloads")
            .add_header(name, value)
            .json(&download(version.id, ActorRole::Anonymous))
            .await;
        second.assert_status(StatusCode::OK);
        assert_eq!(
            second.json::<DownloadTrigger>().status,
            DownloadStatus::AlreadyStarted
        );

        assert_eq!(
            harness.queue.tasks(),
            vec![RemediationTask::SubmitVersion {
                version_id: version.id
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn admin_download_is_ineligible() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let (version, _) = harness.published_pdf();
        let server = create_test_server(&harness)?;
        let (name, value) = internal_key();

        let response = server
            .post("/api/remediation/downloads")
            .add_header(name, value)
            .json(&download(version.id, ActorRole::Admin))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.json::<DownloadTrigger>().status,
            DownloadStatus::Ineligible
        );
        assert!(harness.queue.tasks().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_version_is_not_found() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let server = create_test_server(&harness)?;
        let (name, value) = internal_key();

        let response = server
            .post("/api/remediation/downloads")
            .add_header(name, value)
            .json(&download(Uuid::now_v7(), ActorRole::User))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn internal_api_requires_key() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let (version, _) = harness.published_pdf();
        let server = create_test_server(&harness)?;

        let response = server
            .post("/api/remediation/downloads")
            .json(&download(version.id, ActorRole::User))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(harness.queue.tasks().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn resubmission_supersedes_current_job() -> anyhow::Result<()> {
        let harness = Harness::new(false);
        let (_, file) = harness.published_pdf();
        let server = create_test_server(&harness)?;

        let (name, value) = internal_key();
        let first = server
            .post(&format!("/api/remediation/files/{}/resubmissions", file.id))
            .add_header(name, value)
            .await;
        first.assert_status(StatusCode::OK);

        let (name, value) = internal_key();
        let second = server
            .post(&format!("/api/remediation/files/{}/resubmissions", file.id))
            .add_header(name, value)
            .await;
        second.assert_status(StatusCode::OK);

        let latest = second.json::<Resubmission>().correlation_id;
        assert_ne!(first.json::<Resubmission>().correlation_id, latest);

        let stored = harness.store.file(file.id).expect("file exists");
        assert_eq!(stored.remediation.state(), RemediationState::Submitted);
        assert_eq!(stored.remediation.live_correlation_id(), Some(latest.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn resubmission_rejects_non_pdf() -> anyhow::Result<()> {
        let harness = Harness::new(false);
        let (version, _) = harness.published_pdf();
        let csv = harness
            .store
            .insert_file(version.id, "data.csv", "text/csv", "cc");
        let server = create_test_server(&harness)?;
        let (name, value) = internal_key();

        let response = server
            .post(&format!("/api/remediation/files/{}/resubmissions", csv.id))
            .add_header(name, value)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(harness.remediation.submissions().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn resubmission_of_unknown_file_is_not_found() -> anyhow::Result<()> {
        let harness = Harness::new(false);
        let server = create_test_server(&harness)?;
        let (name, value) = internal_key();

        let response = server
            .post(&format!(
                "/api/remediation/files/{}/resubmissions",
                Uuid::now_v7()
            ))
            .add_header(name, value)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.json::<Value>().get("name").is_some());
        Ok(())
    }
}
