//! Background workers that execute remediation tasks.
//!
//! Every worker pulls from the same durable consumer, so adding workers
//! raises throughput without delivering a task twice at the same time.

mod queue_worker;
mod task_handler;

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use remedy_nats::queue::TaskQueue;
use serde::{Deserialize, Serialize};
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

pub use crate::worker::queue_worker::QueueWorker;
pub use crate::worker::task_handler::TaskHandler;
use crate::service::ServiceState;
use crate::{Error, Result};

/// Tracing target for worker lifecycle and task execution.
pub const TRACING_TARGET: &str = "remedy_server::worker";

/// Default number of concurrent queue workers.
const DEFAULT_CONCURRENCY: usize = 4;

/// Configuration for worker behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct WorkerConfig {
    /// Number of tasks processed concurrently.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "worker-concurrency",
            env = "WORKER_CONCURRENCY",
            default_value_t = DEFAULT_CONCURRENCY
        )
    )]
    #[serde(default = "WorkerConfig::default_concurrency")]
    pub worker_concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl WorkerConfig {
    /// Creates a new worker config with the specified concurrency.
    pub fn with_concurrency(worker_concurrency: usize) -> Self {
        Self { worker_concurrency }
    }

    fn default_concurrency() -> usize {
        DEFAULT_CONCURRENCY
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(1..=64).contains(&self.worker_concurrency) {
            return Err(Error::config("WORKER_CONCURRENCY must be between 1 and 64"));
        }
        Ok(())
    }
}

/// Handles for background workers.
///
/// Holds join handles for all spawned workers, allowing graceful shutdown
/// and status monitoring.
pub struct WorkerHandles {
    workers: Vec<JoinHandle<Result<()>>>,
    cancel_token: CancellationToken,
}

impl WorkerHandles {
    /// Spawns `worker_concurrency` queue workers.
    pub fn spawn(state: &ServiceState, queue: &TaskQueue, config: &WorkerConfig) -> Self {
        let cancel_token = CancellationToken::new();
        let handler = TaskHandler::new(state);

        let workers = (0..config.worker_concurrency.max(1))
            .map(|index| {
                QueueWorker::new(
                    format!("queue-worker-{index}"),
                    queue.clone(),
                    handler.clone(),
                )
                .spawn(cancel_token.clone())
            })
            .collect();

        Self {
            workers,
            cancel_token,
        }
    }

    /// Requests graceful shutdown of all workers.
    ///
    /// Workers finish the task they are running before stopping.
    /// Use [`abort_all`](Self::abort_all) for immediate cancellation.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// Aborts all worker tasks immediately.
    ///
    /// An interrupted task is redelivered once its acknowledgement deadline
    /// passes.
    pub fn abort_all(&self) {
        self.cancel_token.cancel();
        self.workers.iter().for_each(JoinHandle::abort);
    }

    /// Checks if all workers are still running.
    pub fn all_running(&self) -> bool {
        self.workers.iter().all(|w| !w.is_finished())
    }

    /// Checks if any worker has finished (possibly due to error).
    pub fn any_finished(&self) -> bool {
        self.workers.iter().any(JoinHandle::is_finished)
    }

    /// Waits for all workers to complete.
    ///
    /// Returns the first error encountered, if any.
    pub async fn wait_all(self) -> Result<()> {
        let results = futures::future::join_all(self.workers).await;

        for result in results {
            result.map_err(|e| Error::internal("worker", e.to_string()))??;
        }

        Ok(())
    }

    /// Requests graceful shutdown and waits up to `timeout` for it.
    ///
    /// Workers still running after the timeout are aborted.
    pub async fn shutdown_within(self, timeout: Duration) -> Result<()> {
        self.shutdown();
        let aborts: Vec<AbortHandle> = self.workers.iter().map(JoinHandle::abort_handle).collect();

        match tokio::time::timeout(timeout, self.wait_all()).await {
            Ok(result) => result,
            Err(_) => {
                aborts.iter().for_each(AbortHandle::abort);
                Err(Error::internal(
                    "worker",
                    format!("workers did not stop within {}s", timeout.as_secs()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_is_bounded() {
        assert!(WorkerConfig::default().validate().is_ok());
        assert!(WorkerConfig::with_concurrency(0).validate().is_err());
        assert!(WorkerConfig::with_concurrency(65).validate().is_err());
    }
}
