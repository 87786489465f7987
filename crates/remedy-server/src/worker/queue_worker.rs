//! Queue consumption loop.

use std::time::Duration;

use remedy_nats::queue::TaskQueue;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{TRACING_TARGET, TaskHandler};
use crate::Result;

/// Pause after a failed fetch before polling again.
const FETCH_ERROR_BACKOFF: Duration = Duration::from_secs(2);

/// One consumer of the remediation task queue.
pub struct QueueWorker {
    name: String,
    queue: TaskQueue,
    handler: TaskHandler,
}

impl QueueWorker {
    /// Creates a new worker.
    pub fn new(name: impl Into<String>, queue: TaskQueue, handler: TaskHandler) -> Self {
        Self {
            name: name.into(),
            queue,
            handler,
        }
    }

    /// Spawns the worker onto the runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Runs the worker until cancelled.
    ///
    /// Cancellation is observed between tasks, so a running task always
    /// completes and is acknowledged. Logs lifecycle events (start, stop,
    /// errors) internally.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        tracing::info!(
            target: TRACING_TARGET,
            worker = %self.name,
            "Starting queue worker"
        );

        let result = self.run_inner(cancel).await;

        match &result {
            Ok(()) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    worker = %self.name,
                    "Queue worker stopped"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    worker = %self.name,
                    error = %err,
                    "Queue worker failed"
                );
            }
        }

        result
    }

    /// Internal run loop.
    async fn run_inner(&self, cancel: CancellationToken) -> Result<()> {
        let consumer = self.queue.consumer().await?;

        while !cancel.is_cancelled() {
            let processed = self
                .queue
                .process_next(&consumer, |queued| self.handler.run(queued))
                .await;

            if let Err(err) = processed {
                tracing::warn!(
                    target: TRACING_TARGET,
                    worker = %self.name,
                    error = %err,
                    "Failed to fetch task"
                );

                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(FETCH_ERROR_BACKOFF) => {}
                }
            }
        }

        tracing::info!(
            target: TRACING_TARGET,
            worker = %self.name,
            "Queue worker shutdown requested"
        );
        Ok(())
    }
}
