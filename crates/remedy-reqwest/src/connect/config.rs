//! Configuration for the shared reqwest client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the reqwest HTTP client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Timeout for outbound HTTP requests in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout-secs", env = "HTTP_TIMEOUT_SECS")
    )]
    pub http_timeout_secs: Option<u64>,

    /// User-Agent header sent with outbound requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    pub user_agent: Option<String>,
}

impl ReqwestConfig {
    fn default_user_agent() -> String {
        format!("remedy/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.http_timeout_secs = Some(secs);
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the effective timeout, using the default if unset or zero.
    pub fn effective_timeout(&self) -> Duration {
        match self.http_timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Returns the effective user agent, using the default if unset or empty.
    pub fn effective_user_agent(&self) -> String {
        match self.user_agent.as_deref() {
            Some(agent) if !agent.trim().is_empty() => agent.to_owned(),
            _ => Self::default_user_agent(),
        }
    }
}
