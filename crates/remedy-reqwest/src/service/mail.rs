//! Mail relay API client.

use async_trait::async_trait;
#[cfg(feature = "config")]
use clap::Args;
use remedy_core::mail::{MailMessage, MailProvider};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{require_endpoint, require_secret};
use crate::connect::{ReqwestClient, TRACING_TARGET};
use crate::{Error, Result};

/// Mail relay endpoint and bearer token.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MailConfig {
    /// Mail relay endpoint
    #[cfg_attr(feature = "config", arg(long = "mail-api-url", env = "MAIL_API_URL"))]
    pub mail_api_url: Option<Url>,

    /// Bearer token for the mail relay
    #[cfg_attr(feature = "config", arg(long = "mail-api-token", env = "MAIL_API_TOKEN"))]
    pub mail_api_token: Option<String>,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("mail_api_url", &self.mail_api_url)
            .field("mail_api_token", &self.mail_api_token.as_ref().map(|_| "****"))
            .finish()
    }
}

impl MailConfig {
    /// Creates a configuration with both values set.
    pub fn new(api_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            mail_api_url: Some(api_url),
            mail_api_token: Some(api_token.into()),
        }
    }

    /// Validates the endpoint and token.
    pub fn validate(&self) -> Result<()> {
        require_endpoint("MAIL_API_URL", self.mail_api_url.as_ref())?;
        require_secret("MAIL_API_TOKEN", self.mail_api_token.as_deref())?;
        Ok(())
    }
}

/// [`MailProvider`] backed by the mail relay HTTP API.
#[derive(Clone)]
pub struct MailClient {
    client: ReqwestClient,
    endpoint: Url,
    token: String,
}

impl std::fmt::Debug for MailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl MailClient {
    /// Creates a new client, failing if the configuration is incomplete.
    pub fn new(client: ReqwestClient, config: &MailConfig) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: require_endpoint("MAIL_API_URL", config.mail_api_url.as_ref())?,
            token: require_secret("MAIL_API_TOKEN", config.mail_api_token.as_deref())?,
        })
    }
}

#[async_trait]
impl MailProvider for MailClient {
    async fn send(&self, message: &MailMessage) -> remedy_core::Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            subject = %message.subject,
            "Relaying mail"
        );

        let response = self
            .client
            .http()
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(message)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(remedy_core::Error::external_error()
                .with_message(format!("mail relay responded with {status}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;

    use super::*;
    use crate::ReqwestConfig;
    use crate::service::test_server;

    #[tokio::test]
    async fn test_send_posts_message() -> anyhow::Result<()> {
        let received: Arc<Mutex<Vec<Value>>> = Arc::default();
        let router = Router::new()
            .route(
                "/send",
                post(
                    |State(received): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                        if let Ok(mut received) = received.lock() {
                            received.push(body);
                        }
                        StatusCode::ACCEPTED
                    },
                ),
            )
            .with_state(received.clone());
        let base = test_server::spawn(router).await?;

        let config = MailConfig::new(base.join("send")?, "token");
        let client = MailClient::new(ReqwestClient::new(ReqwestConfig::default())?, &config)?;
        client
            .send(&MailMessage {
                to: "ada@example.com".to_owned(),
                subject: "Your work was remediated".to_owned(),
                text: "hello".to_owned(),
            })
            .await?;

        let received = received.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["to"], "ada@example.com");
        assert_eq!(received[0]["text"], "hello");
        Ok(())
    }

    #[tokio::test]
    async fn test_send_failure_is_external_error() -> anyhow::Result<()> {
        let router = Router::new().route("/send", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let base = test_server::spawn(router).await?;

        let config = MailConfig::new(base.join("send")?, "token");
        let client = MailClient::new(ReqwestClient::new(ReqwestConfig::default())?, &config)?;
        let message = MailMessage {
            to: "ada@example.com".to_owned(),
            subject: "s".to_owned(),
            text: "t".to_owned(),
        };
        let error = client.send(&message).await.expect_err("503 must fail");
        assert_eq!(error.kind, remedy_core::ErrorKind::ExternalError);
        Ok(())
    }
}
