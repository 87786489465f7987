use std::fmt;
use std::sync::Arc;

use reqwest::Client;

use super::ReqwestConfig;
use crate::Result;

/// Tracing target for outbound HTTP calls.
pub const TRACING_TARGET: &str = "remedy_reqwest::client";

/// HTTP client shared by the remediation, ticketing and mail integrations.
///
/// Every integration holds a clone, so they share one connection pool and
/// the same timeout and user agent.
#[derive(Clone)]
pub struct ReqwestClient {
    http: Client,
    config: Arc<ReqwestConfig>,
}

impl ReqwestClient {
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .build()?;

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_secs = config.effective_timeout().as_secs(),
            "HTTP client ready"
        );

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub fn config(&self) -> &ReqwestConfig {
        &self.config
    }
}

impl fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_settings() -> anyhow::Result<()> {
        let client = ReqwestClient::new(ReqwestConfig::default().with_timeout_secs(5))?;
        let clone = client.clone();
        assert_eq!(clone.config().http_timeout_secs, Some(5));
        assert!(clone.config().user_agent.is_none());
        Ok(())
    }
}
