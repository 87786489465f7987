//! Task queue boundary.
//!
//! The queue is fire-and-forget with at-least-once delivery: a task may run
//! more than once and consumers must tolerate that.

mod service;

pub use service::TaskQueue;

pub use crate::types::RemediationTask;
pub use crate::{Error, Result};

/// Tracing target for task queue operations.
pub const TRACING_TARGET: &str = "remedy_core::queue";

/// Core trait for task queue implementations.
#[async_trait::async_trait]
pub trait TaskQueueProvider: Send + Sync {
    /// Durably enqueues a task.
    async fn enqueue(&self, task: &RemediationTask) -> Result<()>;
}
