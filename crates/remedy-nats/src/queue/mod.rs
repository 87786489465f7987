//! Durable work queue for remediation tasks.

mod task;
mod worker;

pub use task::{Disposition, QueuedTask, TaskFailure};
pub use worker::{QueueConfig, STREAM_NAME, SUBJECT_PREFIX, TaskQueue};
