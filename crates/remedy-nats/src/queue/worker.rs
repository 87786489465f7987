//! Task queue stream and worker consumption.

use std::future::Future;
use std::time::{Duration, Instant};

use async_nats::jetstream::{self, AckKind, consumer, stream};
#[cfg(feature = "config")]
use clap::Args;
use futures::StreamExt;
use remedy_core::queue::{RemediationTask, TaskQueueProvider};
use serde::{Deserialize, Serialize};

use super::task::{Disposition, QueuedTask, TaskFailure};
use crate::{Error, Result, TRACING_TARGET_QUEUE};

/// Name of the JetStream stream that backs the queue.
pub const STREAM_NAME: &str = "REMEDY_TASKS";

/// Subject prefix; each task kind is published under `remedy.tasks.<kind>`.
pub const SUBJECT_PREFIX: &str = "remedy.tasks";

/// How long a worker may hold a message before it is redelivered.
const ACK_WAIT: Duration = Duration::from_secs(300);

/// Task queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct QueueConfig {
    /// Redeliveries allowed for a task that failed with a retryable error
    #[cfg_attr(
        feature = "config",
        arg(long = "queue-max-retries", env = "QUEUE_MAX_RETRIES", default_value = "5")
    )]
    pub queue_max_retries: u32,

    /// Durable consumer name shared by all workers
    #[cfg_attr(
        feature = "config",
        arg(long = "queue-consumer-name", env = "QUEUE_CONSUMER_NAME", default_value = "remedy-workers")
    )]
    pub queue_consumer_name: String,

    /// Seconds a worker waits for a message before polling again
    #[cfg_attr(
        feature = "config",
        arg(long = "queue-fetch-expiry-secs", env = "QUEUE_FETCH_EXPIRY_SECS", default_value = "5")
    )]
    pub queue_fetch_expiry_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_max_retries: 5,
            queue_consumer_name: "remedy-workers".to_owned(),
            queue_fetch_expiry_secs: 5,
        }
    }
}

impl QueueConfig {
    /// Returns the fetch expiry as a Duration.
    #[inline]
    pub fn fetch_expiry(&self) -> Duration {
        Duration::from_secs(self.queue_fetch_expiry_secs.max(1))
    }
}

/// Work queue for remediation tasks.
///
/// Tasks are published to a work-queue stream and consumed through one
/// durable pull consumer, so each task is handed to a single worker at a time
/// and is removed once acknowledged.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    jetstream: jetstream::Context,
    config: QueueConfig,
}

impl TaskQueue {
    /// Creates the queue, creating its stream when missing.
    #[tracing::instrument(skip(jetstream), target = TRACING_TARGET_QUEUE)]
    pub async fn new(jetstream: &jetstream::Context, config: QueueConfig) -> Result<Self> {
        let stream_config = stream::Config {
            name: STREAM_NAME.to_owned(),
            description: Some("Remediation workflow tasks".to_owned()),
            subjects: vec![format!("{SUBJECT_PREFIX}.>")],
            retention: stream::RetentionPolicy::WorkQueue,
            duplicate_window: Duration::from_secs(120),
            ..Default::default()
        };

        match jetstream.get_stream(STREAM_NAME).await {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_QUEUE,
                    stream = STREAM_NAME,
                    "Using existing task stream"
                );
            }
            Err(_) => {
                tracing::info!(
                    target: TRACING_TARGET_QUEUE,
                    stream = STREAM_NAME,
                    "Creating task stream"
                );
                jetstream
                    .create_stream(stream_config)
                    .await
                    .map_err(|e| Error::stream(STREAM_NAME, e))?;
            }
        }

        Ok(Self {
            jetstream: jetstream.clone(),
            config,
        })
    }

    /// Returns the queue configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Publishes a task and waits for the stream to persist it.
    #[tracing::instrument(skip(self, queued), target = TRACING_TARGET_QUEUE, fields(task_id = %queued.id))]
    pub async fn publish(&self, queued: &QueuedTask) -> Result<()> {
        let subject = Self::subject(&queued.task);
        let payload = serde_json::to_vec(queued)?;

        let mut headers = async_nats::HeaderMap::new();
        headers.insert(async_nats::header::NATS_MESSAGE_ID, queued.id.to_string().as_str());

        self.jetstream
            .publish_with_headers(subject.clone(), headers, payload.into())
            .await
            .map_err(|e| Error::publish(&subject, e))?
            .await
            .map_err(|e| Error::publish(&subject, e))?;

        tracing::debug!(
            target: TRACING_TARGET_QUEUE,
            task = %queued.task.kind(),
            subject = %subject,
            "Published task"
        );
        Ok(())
    }

    /// Gets or creates the durable consumer shared by all workers.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn consumer(&self) -> Result<consumer::PullConsumer> {
        let name = self.config.queue_consumer_name.clone();
        let consumer_config = consumer::pull::Config {
            durable_name: Some(name.clone()),
            description: Some("Remediation task workers".to_owned()),
            filter_subject: format!("{SUBJECT_PREFIX}.>"),
            ack_policy: consumer::AckPolicy::Explicit,
            ack_wait: ACK_WAIT,
            max_deliver: i64::from(self.config.queue_max_retries) + 1,
            ..Default::default()
        };

        let stream = self
            .jetstream
            .get_stream(STREAM_NAME)
            .await
            .map_err(|e| Error::stream(STREAM_NAME, e))?;

        let consumer = stream
            .get_or_create_consumer(&name, consumer_config)
            .await
            .map_err(|e| Error::consumer(&name, e))?;

        tracing::debug!(
            target: TRACING_TARGET_QUEUE,
            consumer = %name,
            "Worker consumer ready"
        );
        Ok(consumer)
    }

    /// Waits for the next task and runs `handler` on it.
    ///
    /// Returns `false` when no task arrived before the fetch expired.
    /// Handler failures never surface here; they decide whether the message
    /// is redelivered or discarded.
    pub async fn process_next<F, Fut>(
        &self,
        consumer: &consumer::PullConsumer,
        handler: F,
    ) -> Result<bool>
    where
        F: FnOnce(QueuedTask) -> Fut,
        Fut: Future<Output = std::result::Result<(), TaskFailure>>,
    {
        let mut messages = consumer
            .batch()
            .max_messages(1)
            .expires(self.config.fetch_expiry())
            .messages()
            .await
            .map_err(|e| Error::operation("task_fetch", e))?;

        let msg = match messages.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => return Err(Error::operation("task_fetch", e)),
            None => return Ok(false),
        };

        let queued: QueuedTask = match serde_json::from_slice(&msg.payload) {
            Ok(queued) => queued,
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_QUEUE,
                    subject = %msg.subject,
                    error = %e,
                    "Discarding undecodable task"
                );
                msg.ack()
                    .await
                    .map_err(|e| Error::operation("task_ack", e))?;
                return Ok(true);
            }
        };

        let delivered = msg
            .info()
            .map(|info| u64::try_from(info.delivered).unwrap_or(1))
            .unwrap_or(1);
        let task_id = queued.id;
        let kind = queued.task.kind();

        tracing::debug!(
            target: TRACING_TARGET_QUEUE,
            task_id = %task_id,
            task = %kind,
            delivered,
            "Processing task"
        );

        let start = Instant::now();
        let result = handler(queued).await;
        let elapsed = start.elapsed();

        match (Disposition::of(&result, delivered, self.config.queue_max_retries), &result) {
            (Disposition::Complete, _) => {
                tracing::info!(
                    target: TRACING_TARGET_QUEUE,
                    task_id = %task_id,
                    task = %kind,
                    elapsed_ms = elapsed.as_millis(),
                    "Task completed"
                );
                msg.ack()
                    .await
                    .map_err(|e| Error::operation("task_ack", e))?;
            }
            (Disposition::Retry(delay), Err(failure)) => {
                tracing::warn!(
                    target: TRACING_TARGET_QUEUE,
                    task_id = %task_id,
                    task = %kind,
                    delivered,
                    retry_in = ?delay,
                    error = %failure.message,
                    "Task failed, will retry"
                );
                msg.ack_with(AckKind::Nak(Some(delay)))
                    .await
                    .map_err(|e| Error::operation("task_nak", e))?;
            }
            (_, failure) => {
                tracing::error!(
                    target: TRACING_TARGET_QUEUE,
                    task_id = %task_id,
                    task = %kind,
                    delivered,
                    error = ?failure.as_ref().err().map(|f| f.message.as_str()),
                    "Task failed permanently"
                );
                msg.ack()
                    .await
                    .map_err(|e| Error::operation("task_ack", e))?;
            }
        }

        Ok(true)
    }

    /// Subject a task is published under.
    pub fn subject(task: &RemediationTask) -> String {
        format!("{SUBJECT_PREFIX}.{}", task.kind())
    }
}

#[async_trait::async_trait]
impl TaskQueueProvider for TaskQueue {
    async fn enqueue(&self, task: &RemediationTask) -> remedy_core::Result<()> {
        self.publish(&QueuedTask::new(task.clone())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn subject_follows_task_kind() {
        let task = RemediationTask::NotifyRemediated {
            version_id: Uuid::nil(),
        };
        assert_eq!(TaskQueue::subject(&task), "remedy.tasks.notify_remediated");

        let task = RemediationTask::EscalateFailure {
            correlation_id: "uuid-1".to_owned(),
            message: "unreadable".to_owned(),
        };
        assert_eq!(TaskQueue::subject(&task), "remedy.tasks.escalate_failure");
    }

    #[test]
    fn default_config_allows_retries() {
        let config = QueueConfig::default();
        assert_eq!(config.queue_max_retries, 5);
        assert_eq!(config.fetch_expiry(), Duration::from_secs(5));
    }
}
