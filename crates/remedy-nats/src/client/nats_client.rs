//! Connection to the NATS server that hosts the task stream and the
//! artifact bucket.

use std::sync::Arc;
use std::time::Duration;

use async_nats::{Client, ConnectOptions, jetstream};

use super::nats_config::NatsConfig;
use crate::object::ArtifactBucket;
use crate::queue::{QueueConfig, TaskQueue};
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// Longest pause between two reconnection attempts.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Fallback bound on the initial handshake.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared NATS connection and its JetStream context.
///
/// `async-nats` multiplexes every call over one connection and reconnects by
/// itself, so clones are cheap and stay valid across outages.
#[derive(Debug, Clone)]
pub struct NatsClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    client: Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Validates `config` and opens the connection.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CONNECTION)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        config.validate()?;

        let connect_timeout = config.connect_timeout().unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let client = tokio::time::timeout(
            connect_timeout,
            async_nats::connect_with_options(&config.nats_url, connect_options(&config)),
        )
        .await
        .map_err(|_| Error::Timeout(connect_timeout))?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server = %info.host,
            version = %info.version,
            max_payload = info.max_payload,
            "Connected to NATS"
        );

        let jetstream = jetstream::new(client.clone());
        Ok(Self {
            inner: Arc::new(Inner {
                client,
                jetstream,
                config,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &NatsConfig {
        &self.inner.config
    }

    /// Opens the remediation task stream, creating it on first use.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CLIENT)]
    pub async fn task_queue(&self, config: QueueConfig) -> Result<TaskQueue> {
        TaskQueue::new(&self.inner.jetstream, config).await
    }

    /// Opens the bucket holding downloaded remediated artifacts.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CLIENT)]
    pub async fn artifact_bucket(&self) -> Result<ArtifactBucket> {
        ArtifactBucket::new(&self.inner.jetstream).await
    }
}

fn connect_options(config: &NatsConfig) -> ConnectOptions {
    let base_delay = config.reconnect_delay();
    let mut options = ConnectOptions::new()
        .name(config.name())
        .ping_interval(config.ping_interval())
        .reconnect_delay_callback(move |attempts| {
            let factor = 2_u32.saturating_pow(attempts.min(16) as u32);
            base_delay.saturating_mul(factor).min(MAX_RECONNECT_DELAY)
        });

    if let Some(token) = config.nats_token.clone() {
        options = options.token(token);
    }
    if let Some(timeout) = config.connect_timeout() {
        options = options.connection_timeout(timeout);
    }
    if let Some(max_reconnects) = config.max_reconnects() {
        options = options.max_reconnects(max_reconnects);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_settings_fail_before_connecting() {
        let result = NatsClient::connect(NatsConfig::new("http://localhost:4222")).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
