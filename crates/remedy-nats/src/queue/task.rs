//! Queue envelope and delivery outcome.

use std::time::Duration;

use jiff::Timestamp;
use remedy_core::queue::RemediationTask;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base delay applied between redeliveries of a failed task.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(10);

/// A task as it travels through the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTask {
    /// Unique envelope identifier, used for deduplication at publish time.
    pub id: Uuid,
    /// The task to run.
    #[serde(flatten)]
    pub task: RemediationTask,
    /// Timestamp when the task was enqueued.
    pub enqueued_at: Timestamp,
}

impl QueuedTask {
    /// Wraps a task in a new envelope.
    pub fn new(task: RemediationTask) -> Self {
        Self {
            id: Uuid::now_v7(),
            task,
            enqueued_at: Timestamp::now(),
        }
    }
}

/// Failure reported by a task handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Human-readable reason.
    pub message: String,
    /// Whether running the task again may succeed.
    pub retryable: bool,
}

impl TaskFailure {
    /// Creates a failure that should be retried.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a failure that retrying cannot fix.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

impl From<remedy_core::Error> for TaskFailure {
    fn from(error: remedy_core::Error) -> Self {
        Self {
            retryable: error.is_retryable(),
            message: error.to_string(),
        }
    }
}

/// What to do with a delivered message after its handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The task completed; remove it.
    Complete,
    /// Redeliver after the delay.
    Retry(Duration),
    /// The task failed for good; remove it.
    Discard,
}

impl Disposition {
    /// Decides the disposition of a message delivered for the `delivered`-th time.
    pub fn of(result: &Result<(), TaskFailure>, delivered: u64, max_retries: u32) -> Self {
        match result {
            Ok(()) => Self::Complete,
            Err(failure) if failure.retryable && delivered <= u64::from(max_retries) => {
                let factor = u32::try_from(delivered.max(1)).unwrap_or(u32::MAX);
                Self::Retry(RETRY_BASE_DELAY.saturating_mul(factor))
            }
            Err(_) => Self::Discard,
        }
    }
}

#[cfg(test)]
mod tests {
    use remedy_core::Error;

    use super::*;

    #[test]
    fn envelope_keeps_task_tag() -> anyhow::Result<()> {
        let queued = QueuedTask::new(RemediationTask::SubmitVersion {
            version_id: Uuid::nil(),
        });

        let value = serde_json::to_value(&queued)?;
        assert_eq!(value["task"], "submit_version");

        let parsed: QueuedTask = serde_json::from_value(value)?;
        assert_eq!(parsed, queued);
        Ok(())
    }

    #[test]
    fn retryable_failures_back_off_until_exhausted() {
        let failed = Err(TaskFailure::retryable("ticket service down"));

        assert_eq!(
            Disposition::of(&failed, 1, 3),
            Disposition::Retry(Duration::from_secs(10))
        );
        assert_eq!(
            Disposition::of(&failed, 3, 3),
            Disposition::Retry(Duration::from_secs(30))
        );
        assert_eq!(Disposition::of(&failed, 4, 3), Disposition::Discard);
    }

    #[test]
    fn permanent_failures_are_discarded() {
        let failure = TaskFailure::from(Error::invalid_input().with_message("bad url"));
        assert!(!failure.retryable);
        assert_eq!(Disposition::of(&Err(failure), 1, 3), Disposition::Discard);
        assert_eq!(Disposition::of(&Ok(()), 1, 3), Disposition::Complete);
    }
}
