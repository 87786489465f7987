//! Task queue wrapper with observability.

use std::fmt;
use std::sync::Arc;

use super::{RemediationTask, Result, TRACING_TARGET, TaskQueueProvider};

/// Task queue wrapper with observability.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<dyn TaskQueueProvider>,
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue").finish_non_exhaustive()
    }
}

impl TaskQueue {
    /// Create a new task queue wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: TaskQueueProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Durably enqueues a task.
    pub async fn enqueue(&self, task: RemediationTask) -> Result<()> {
        let kind = task.kind();
        let result = self.inner.enqueue(&task).await;

        match &result {
            Ok(()) => tracing::info!(
                target: TRACING_TARGET,
                task = %kind,
                "Task enqueued"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                task = %kind,
                error = %error,
                "Failed to enqueue task"
            ),
        }

        result
    }
}
