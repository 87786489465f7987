//! Dispatch of queued tasks to the orchestration services.

use remedy_core::ErrorKind;
use remedy_core::queue::RemediationTask;
use remedy_nats::queue::{QueuedTask, TaskFailure};

use super::TRACING_TARGET;
use crate::service::{
    FailureEscalation, FailureRecorder, RemediationNotifier, ResultBuilder, ServiceState,
    SubmissionDispatcher,
};

/// Runs one [`RemediationTask`] against the orchestration services.
#[derive(Clone)]
pub struct TaskHandler {
    dispatcher: SubmissionDispatcher,
    result_builder: ResultBuilder,
    failures: FailureRecorder,
    escalation: FailureEscalation,
    notifier: RemediationNotifier,
}

impl TaskHandler {
    /// Creates a handler sharing the services of `state`.
    pub fn new(state: &ServiceState) -> Self {
        Self {
            dispatcher: state.dispatcher.clone(),
            result_builder: state.result_builder.clone(),
            failures: state.failures.clone(),
            escalation: state.escalation.clone(),
            notifier: state.notifier.clone(),
        }
    }

    /// Runs a task taken from the queue.
    pub async fn run(&self, queued: QueuedTask) -> Result<(), TaskFailure> {
        self.handle(queued.task).await
    }

    /// Runs a task, classifying errors for the queue.
    pub async fn handle(&self, task: RemediationTask) -> Result<(), TaskFailure> {
        match task {
            RemediationTask::SubmitVersion { version_id } => {
                let summary = self.dispatcher.dispatch_version(version_id).await?;
                tracing::info!(
                    target: TRACING_TARGET,
                    version_id = %version_id,
                    submitted = summary.submitted,
                    skipped = summary.skipped,
                    "Version dispatched"
                );
            }
            RemediationTask::BuildRemediatedVersion {
                correlation_id,
                output_url,
            } => {
                let outcome = match self.result_builder.build(&correlation_id, &output_url).await {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        self.record_permanent_failure(&correlation_id, &error).await;
                        return Err(error.into());
                    }
                };
                tracing::info!(
                    target: TRACING_TARGET,
                    correlation_id = %correlation_id,
                    outcome = %outcome,
                    "Remediation result applied"
                );
            }
            RemediationTask::EscalateFailure {
                correlation_id,
                message,
            } => {
                let receipt = self.escalation.escalate(&correlation_id, &message).await?;
                tracing::info!(
                    target: TRACING_TARGET,
                    correlation_id = %correlation_id,
                    ticket_id = %receipt.id,
                    "Failure escalated"
                );
            }
            RemediationTask::NotifyRemediated { version_id } => {
                let summary = self.notifier.notify(version_id).await?;
                tracing::info!(
                    target: TRACING_TARGET,
                    version_id = %version_id,
                    ticket_id = %summary.ticket_id,
                    delivered = summary.delivered.len(),
                    undelivered = summary.undelivered.len(),
                    "Remediation announced"
                );
            }
        }

        Ok(())
    }

    /// Marks the file as failed when building its version can never succeed.
    ///
    /// Retryable errors are left to redelivery. A missing file means the
    /// job was superseded and has nothing to mark.
    async fn record_permanent_failure(&self, correlation_id: &str, error: &remedy_core::Error) {
        if error.is_retryable() || error.kind == ErrorKind::NotFound {
            return;
        }

        if let Err(record_error) = self
            .failures
            .record(correlation_id, &error.to_string())
            .await
        {
            tracing::warn!(
                target: TRACING_TARGET,
                correlation_id = %correlation_id,
                error = %record_error,
                "Failed to record remediation failure"
            );
        }
    }
}
