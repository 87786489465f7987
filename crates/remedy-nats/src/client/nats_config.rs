//! Connection settings read from `NATS_*` variables.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_NAME: &str = "remedy";
const DEFAULT_MAX_RECONNECTS: usize = 10;
const RECONNECT_DELAY: Duration = Duration::from_secs(2);
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Where the task stream lives and how to stay connected to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct NatsConfig {
    /// Server URL; several may be given separated by commas
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-url", env = "NATS_URL", default_value = "nats://127.0.0.1:4222")
    )]
    pub nats_url: String,

    /// Authentication token
    #[cfg_attr(feature = "config", arg(long = "nats-token", env = "NATS_TOKEN"))]
    pub nats_token: Option<String>,

    /// Connection name shown in the server's monitoring
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-client-name", env = "NATS_CLIENT_NAME")
    )]
    pub nats_client_name: Option<String>,

    /// Handshake timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-connect-timeout", env = "NATS_CONNECT_TIMEOUT_SECS")
    )]
    pub nats_connect_timeout: Option<u64>,

    /// Reconnection attempts before giving up, 0 for no limit
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-max-reconnects", env = "NATS_MAX_RECONNECTS")
    )]
    pub nats_max_reconnects: Option<usize>,
}

impl NatsConfig {
    pub fn new(nats_url: impl Into<String>) -> Self {
        Self {
            nats_url: nats_url.into(),
            nats_token: None,
            nats_client_name: None,
            nats_connect_timeout: None,
            nats_max_reconnects: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.nats_client_name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    /// Splits `nats_url` into individual server URLs.
    pub fn servers(&self) -> impl Iterator<Item = &str> {
        self.nats_url.split(',').map(str::trim).filter(|s| !s.is_empty())
    }

    #[inline]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.nats_connect_timeout.map(Duration::from_secs)
    }

    /// First reconnection delay; later attempts back off exponentially.
    #[inline]
    pub fn reconnect_delay(&self) -> Duration {
        RECONNECT_DELAY
    }

    #[inline]
    pub fn ping_interval(&self) -> Duration {
        PING_INTERVAL
    }

    /// Returns the reconnection limit, or `None` when unlimited.
    pub fn max_reconnects(&self) -> Option<usize> {
        match self.nats_max_reconnects.unwrap_or(DEFAULT_MAX_RECONNECTS) {
            0 => None,
            max => Some(max),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.nats_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.nats_client_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.nats_connect_timeout = Some(secs);
        self
    }

    #[must_use]
    pub fn with_max_reconnects(mut self, max_reconnects: usize) -> Self {
        self.nats_max_reconnects = Some(max_reconnects);
        self
    }

    /// Requires at least one `nats://` server and a non-blank token if set.
    pub fn validate(&self) -> Result<()> {
        let mut servers = self.servers().peekable();
        if servers.peek().is_none() {
            return Err(Error::config("NATS_URL names no server"));
        }
        if let Some(server) = servers.find(|s| !s.starts_with("nats://")) {
            return Err(Error::config(format!("{server} is not a nats:// URL")));
        }
        if self.nats_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::config("NATS_TOKEN is blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bound_reconnection() {
        let config = NatsConfig::new("nats://localhost:4222");
        assert_eq!(config.name(), "remedy");
        assert_eq!(config.connect_timeout(), None);
        assert_eq!(config.max_reconnects(), Some(10));
        assert_eq!(config.with_max_reconnects(0).max_reconnects(), None);
    }

    #[test]
    fn cluster_urls_are_split_and_trimmed() {
        let config = NatsConfig::new("nats://a:4222, nats://b:4222,");
        assert_eq!(
            config.servers().collect::<Vec<_>>(),
            ["nats://a:4222", "nats://b:4222"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_settings() {
        assert!(NatsConfig::new("").validate().is_err());
        assert!(NatsConfig::new("nats://a:4222,http://b:4222").validate().is_err());
        assert!(
            NatsConfig::new("nats://localhost:4222")
                .with_token(" ")
                .validate()
                .is_err()
        );
    }
}
