//! Recording task queue.

use std::sync::{Arc, Mutex, MutexGuard};

use remedy_core::queue::{RemediationTask, TaskQueueProvider};
use remedy_core::{Error, Result};

#[derive(Debug, Default)]
struct State {
    tasks: Vec<RemediationTask>,
    failing: bool,
}

/// Task queue that keeps enqueued tasks in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingQueue {
    inner: Arc<Mutex<State>>,
}

impl RecordingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every following enqueue fail.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Tasks enqueued so far.
    pub fn tasks(&self) -> Vec<RemediationTask> {
        self.lock().tasks.clone()
    }

    /// Removes and returns every enqueued task.
    pub fn drain(&self) -> Vec<RemediationTask> {
        std::mem::take(&mut self.lock().tasks)
    }
}

#[async_trait::async_trait]
impl TaskQueueProvider for RecordingQueue {
    async fn enqueue(&self, task: &RemediationTask) -> Result<()> {
        let mut state = self.lock();
        if state.failing {
            return Err(Error::service_unavailable().with_message("task queue is unavailable"));
        }
        state.tasks.push(task.clone());
        Ok(())
    }
}
