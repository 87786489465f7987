//! Ticketing API client.

use async_trait::async_trait;
#[cfg(feature = "config")]
use clap::Args;
use remedy_core::ticket::{TicketProvider, TicketReceipt, TicketRequest};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{require_endpoint, require_secret};
use crate::connect::{ReqwestClient, TRACING_TARGET};
use crate::{Error, Result};

/// Ticketing API endpoint and bearer token.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct TicketConfig {
    /// Ticket creation endpoint
    #[cfg_attr(feature = "config", arg(long = "ticket-api-url", env = "TICKET_API_URL"))]
    pub ticket_api_url: Option<Url>,

    /// Bearer token for the ticketing API
    #[cfg_attr(
        feature = "config",
        arg(long = "ticket-api-token", env = "TICKET_API_TOKEN")
    )]
    pub ticket_api_token: Option<String>,
}

impl std::fmt::Debug for TicketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketConfig")
            .field("ticket_api_url", &self.ticket_api_url)
            .field("ticket_api_token", &self.ticket_api_token.as_ref().map(|_| "****"))
            .finish()
    }
}

impl TicketConfig {
    /// Creates a configuration with both values set.
    pub fn new(api_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            ticket_api_url: Some(api_url),
            ticket_api_token: Some(api_token.into()),
        }
    }

    /// Validates the endpoint and token.
    pub fn validate(&self) -> Result<()> {
        require_endpoint("TICKET_API_URL", self.ticket_api_url.as_ref())?;
        require_secret("TICKET_API_TOKEN", self.ticket_api_token.as_deref())?;
        Ok(())
    }
}

/// [`TicketProvider`] backed by the ticketing HTTP API.
#[derive(Clone)]
pub struct TicketClient {
    client: ReqwestClient,
    endpoint: Url,
    token: String,
}

impl std::fmt::Debug for TicketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl TicketClient {
    /// Creates a new client, failing if the configuration is incomplete.
    pub fn new(client: ReqwestClient, config: &TicketConfig) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: require_endpoint("TICKET_API_URL", config.ticket_api_url.as_ref())?,
            token: require_secret("TICKET_API_TOKEN", config.ticket_api_token.as_deref())?,
        })
    }
}

#[async_trait]
impl TicketProvider for TicketClient {
    async fn create_ticket(&self, request: &TicketRequest) -> remedy_core::Result<TicketReceipt> {
        tracing::debug!(
            target: TRACING_TARGET,
            work_id = %request.work_id,
            ticket_type = %request.ticket_type,
            "Creating ticket"
        );

        let response = self
            .client
            .http()
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(remedy_core::Error::authentication()
                .with_message("ticketing API rejected the token"));
        }
        if !status.is_success() {
            return Err(remedy_core::Error::external_error()
                .with_message(format!("unexpected response from ticketing API: {status}")));
        }

        let receipt: TicketReceipt = response.json().await.map_err(Error::from)?;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use remedy_core::ErrorKind;
    use remedy_core::ticket::TicketKind;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;
    use crate::ReqwestConfig;
    use crate::service::test_server;

    fn request() -> TicketRequest {
        TicketRequest {
            work_id: Uuid::nil(),
            ticket_type: TicketKind::RemediationFailed,
            subject: "Auto-remediation failed".to_owned(),
            body: "boom".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_ticket() -> anyhow::Result<()> {
        let router = Router::new().route(
            "/tickets",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .is_some_and(|value| value.as_bytes() == b"Bearer token-1");
                if authorized && body["ticket_type"] == "remediation_failed" {
                    (StatusCode::CREATED, Json(json!({ "id": "T-100" })))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({})))
                }
            }),
        );
        let base = test_server::spawn(router).await?;

        let config = TicketConfig::new(base.join("tickets")?, "token-1");
        let client = TicketClient::new(ReqwestClient::new(ReqwestConfig::default())?, &config)?;
        let receipt = client.create_ticket(&request()).await?;
        assert_eq!(receipt.id, "T-100");

        let config = TicketConfig::new(base.join("tickets")?, "wrong");
        let client = TicketClient::new(ReqwestClient::new(ReqwestConfig::default())?, &config)?;
        let error = client.create_ticket(&request()).await.expect_err("bad token");
        assert_eq!(error.kind, ErrorKind::Authentication);
        Ok(())
    }

    #[test]
    fn test_config_validation() -> anyhow::Result<()> {
        assert!(TicketConfig::default().validate().is_err());
        let config = TicketConfig::new(Url::parse("https://tickets.example.com/api")?, "t");
        assert!(config.validate().is_ok());
        Ok(())
    }
}
