//! Remediation service callbacks.
//!
//! The receiver only enqueues work and writes failure markers; building
//! versions and opening tickets happen in the queue workers.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use remedy_core::types::EventType;
use remedy_core::queue::{RemediationTask, TaskQueue};

use crate::extract::Json;
use crate::handler::request::{JobPayload, WebhookEvent};
use crate::handler::response::WebhookReply;
use crate::service::{FailureRecorder, ServiceState};

/// Tracing target for webhook operations.
const TRACING_TARGET: &str = "remedy_server::handler::webhooks";

/// Receives a job callback from the remediation service.
#[tracing::instrument(
    skip_all,
    fields(
        event_type = %event.event_type,
        correlation_id = %event.job.uuid,
    )
)]
async fn receive_event(
    State(queue): State<TaskQueue>,
    State(failures): State<FailureRecorder>,
    Json(event): Json<WebhookEvent>,
) -> WebhookReply {
    match event.event_type.parse::<EventType>() {
        Ok(EventType::JobSucceeded) => job_succeeded(&queue, &failures, event.job).await,
        Ok(EventType::JobFailed) => job_failed(&queue, &failures, event.job).await,
        Err(_) => {
            tracing::warn!(target: TRACING_TARGET, "Unknown webhook event type");
            WebhookReply::Rejected("Unknown event type".to_owned())
        }
    }
}

async fn job_succeeded(
    queue: &TaskQueue,
    failures: &FailureRecorder,
    job: JobPayload,
) -> WebhookReply {
    let scheduled = match job.output_url {
        Some(output_url) => {
            queue
                .enqueue(RemediationTask::BuildRemediatedVersion {
                    correlation_id: job.uuid.clone(),
                    output_url,
                })
                .await
        }
        None => Err(remedy_core::Error::invalid_input()
            .with_message("succeeded job carries no output_url")),
    };

    match scheduled {
        Ok(()) => {
            tracing::info!(target: TRACING_TARGET, "Version build scheduled");
            WebhookReply::Handled("Update successful".to_owned())
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                "Failed to schedule version build"
            );
            record_failure(failures, &job.uuid, &error.to_string()).await;
            WebhookReply::Failed(error.to_string())
        }
    }
}

async fn job_failed(queue: &TaskQueue, failures: &FailureRecorder, job: JobPayload) -> WebhookReply {
    let message = job.processing_error_message.unwrap_or_default();
    tracing::warn!(
        target: TRACING_TARGET,
        processing_error = %message,
        "Remediation job failed"
    );

    if !record_failure(failures, &job.uuid, &message).await {
        tracing::info!(target: TRACING_TARGET, "Skipping escalation for stale callback");
        return WebhookReply::Handled(message);
    }

    let escalation = RemediationTask::EscalateFailure {
        correlation_id: job.uuid.clone(),
        message: message.clone(),
    };
    if let Err(error) = queue.enqueue(escalation).await {
        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            "Failed to schedule failure escalation"
        );
    }

    WebhookReply::Handled(message)
}

/// Marks the file as failed and returns `false` when no file holds the id.
async fn record_failure(failures: &FailureRecorder, correlation_id: &str, reason: &str) -> bool {
    match failures.record(correlation_id, reason).await {
        Ok(_) => true,
        Err(error) if error.is_not_found() => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "No file holds the correlation id; callback is stale"
            );
            false
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                "Failed to record remediation failure"
            );
            true
        }
    }
}

/// Returns a [`Router`] with the remediation webhook.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/webhooks/remediation", post(receive_event))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use jiff::Timestamp;
    use remedy_core::DocumentStore;
    use remedy_core::types::RemediationState;
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::create_test_server;
    use crate::service::testing::{Harness, WEBHOOK_KEY};

    const PATH: &str = "/webhooks/remediation";

    fn api_key(value: &'static str) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static(value),
        )
    }

    async fn submitted(harness: &Harness, correlation_id: &str) -> anyhow::Result<uuid::Uuid> {
        let (_, file) = harness.published_pdf();
        harness
            .store
            .record_submission(file.id, correlation_id, Timestamp::now())
            .await?;
        Ok(file.id)
    }

    fn state_of(harness: &Harness, file_id: uuid::Uuid) -> Option<RemediationState> {
        harness.store.file(file_id).map(|f| f.remediation.state())
    }

    #[tokio::test]
    async fn missing_key_is_unauthorized() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let file_id = submitted(&harness, "uuid-2").await?;
        let server = create_test_server(&harness)?;

        let response = server
            .post(PATH)
            .json(&json!({
                "event_type": "job.failed",
                "job": { "uuid": "uuid-2", "processing_error_message": "boom" }
            }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.text().is_empty());
        assert!(harness.queue.tasks().is_empty());
        assert_eq!(state_of(&harness, file_id), Some(RemediationState::Submitted));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_key_is_unauthorized() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let server = create_test_server(&harness)?;
        let (name, value) = api_key("not-the-key");

        let response = server
            .post(PATH)
            .add_header(name, value)
            .json(&json!({ "event_type": "job.succeeded", "job": { "uuid": "uuid-2" } }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(harness.queue.tasks().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_event_is_rejected() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let server = create_test_server(&harness)?;
        let (name, value) = api_key(WEBHOOK_KEY);

        let response = server
            .post(PATH)
            .add_header(name, value)
            .json(&json!({ "event_type": "job.started", "job": { "uuid": "uuid-2" } }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "Unknown event type" })
        );
        assert!(harness.queue.tasks().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn success_schedules_version_build() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        submitted(&harness, "uuid-2").await?;
        let server = create_test_server(&harness)?;
        let (name, value) = api_key(WEBHOOK_KEY);

        let response = server
            .post(PATH)
            .add_header(name, value)
            .json(&json!({
                "event_type": "job.succeeded",
                "job": { "uuid": "uuid-2", "output_url": "https://example.com/out.pdf" }
            }))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.json::<Value>(),
            json!({ "message": "Update successful" })
        );
        assert_eq!(
            harness.queue.tasks(),
            vec![RemediationTask::BuildRemediatedVersion {
                correlation_id: "uuid-2".to_owned(),
                output_url: "https://example.com/out.pdf".to_owned(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failure_echoes_message_and_escalates() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let file_id = submitted(&harness, "uuid-3").await?;
        let server = create_test_server(&harness)?;
        let (name, value) = api_key(WEBHOOK_KEY);

        let response = server
            .post(PATH)
            .add_header(name, value)
            .json(&json!({
                "event_type": "job.failed",
                "job": { "uuid": "uuid-3", "processing_error_message": "Something went wrong" }
            }))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.json::<Value>(),
            json!({ "message": "Something went wrong" })
        );

        let file = harness.store.file(file_id).expect("file exists");
        assert_eq!(file.remediation.state(), RemediationState::Failed);
        assert!(file.remediation.failed_at().is_some());
        assert_eq!(
            harness.queue.tasks(),
            vec![RemediationTask::EscalateFailure {
                correlation_id: "uuid-3".to_owned(),
                message: "Something went wrong".to_owned(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn scheduling_error_marks_file_failed() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let file_id = submitted(&harness, "uuid-4").await?;
        harness.queue.set_failing(true);
        let server = create_test_server(&harness)?;
        let (name, value) = api_key(WEBHOOK_KEY);

        let response = server
            .post(PATH)
            .add_header(name, value)
            .json(&json!({
                "event_type": "job.succeeded",
                "job": { "uuid": "uuid-4", "output_url": "https://example.com/out.pdf" }
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<Value>();
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert_eq!(state_of(&harness, file_id), Some(RemediationState::Failed));
        Ok(())
    }

    #[tokio::test]
    async fn stale_failure_is_acknowledged_without_escalation() -> anyhow::Result<()> {
        let harness = Harness::new(true);
        let file_id = submitted(&harness, "uuid-5").await?;
        harness
            .store
            .record_submission(file_id, "uuid-6", Timestamp::now())
            .await?;
        let server = create_test_server(&harness)?;
        let (name, value) = api_key(WEBHOOK_KEY);

        let response = server
            .post(PATH)
            .add_header(name, value)
            .json(&json!({
                "event_type": "job.failed",
                "job": { "uuid": "uuid-5", "processing_error_message": "late" }
            }))
            .await;

        response.assert_status(StatusCode::OK);
        let file = harness.store.file(file_id).expect("file exists");
        assert_eq!(file.remediation.live_correlation_id(), Some("uuid-6"));
        assert!(harness.queue.tasks().is_empty());
        Ok(())
    }
}
