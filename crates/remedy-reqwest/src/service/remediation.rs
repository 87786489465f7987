//! Remediation API client.

use async_trait::async_trait;
#[cfg(feature = "config")]
use clap::Args;
use remedy_core::remediation::{
    Artifact, RemediationProvider, SubmissionReceipt, SubmissionRequest,
};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{require_endpoint, require_secret};
use crate::connect::{ReqwestClient, TRACING_TARGET};
use crate::{Error, Result};

/// Header carrying the remediation API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Remediation API endpoint and credentials.
///
/// Both values are optional so that deployments with auto-remediation
/// disabled can start without them.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RemediationConfig {
    /// Submission endpoint of the remediation API
    #[cfg_attr(
        feature = "config",
        arg(long = "remediation-api-url", env = "REMEDIATION_API_URL")
    )]
    pub remediation_api_url: Option<Url>,

    /// API key sent in the X-API-KEY header
    #[cfg_attr(
        feature = "config",
        arg(long = "remediation-api-key", env = "REMEDIATION_API_KEY")
    )]
    pub remediation_api_key: Option<String>,
}

impl std::fmt::Debug for RemediationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemediationConfig")
            .field("remediation_api_url", &self.remediation_api_url)
            .field(
                "remediation_api_key",
                &self.remediation_api_key.as_ref().map(|_| "****"),
            )
            .finish()
    }
}

impl RemediationConfig {
    /// Creates a configuration with both values set.
    pub fn new(api_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            remediation_api_url: Some(api_url),
            remediation_api_key: Some(api_key.into()),
        }
    }

    /// Returns whether both the endpoint and the key are present.
    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates the endpoint and key.
    pub fn validate(&self) -> Result<()> {
        require_endpoint("REMEDIATION_API_URL", self.remediation_api_url.as_ref())?;
        require_secret("REMEDIATION_API_KEY", self.remediation_api_key.as_deref())?;
        Ok(())
    }
}

/// Maps a non-success submission status to a typed error.
fn submission_error(status: StatusCode) -> remedy_core::Error {
    match status {
        StatusCode::UNAUTHORIZED => remedy_core::Error::authentication()
            .with_message("remediation API rejected the credentials"),
        StatusCode::UNPROCESSABLE_ENTITY => remedy_core::Error::invalid_input()
            .with_message("remediation API rejected the file URL"),
        status => remedy_core::Error::external_error()
            .with_message(format!("unexpected response from remediation API: {status}")),
    }
}

/// [`RemediationProvider`] backed by the remediation HTTP API.
#[derive(Clone)]
pub struct RemediationClient {
    client: ReqwestClient,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for RemediationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemediationClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl RemediationClient {
    /// Creates a new client, failing if the configuration is incomplete.
    pub fn new(client: ReqwestClient, config: &RemediationConfig) -> Result<Self> {
        let endpoint = require_endpoint("REMEDIATION_API_URL", config.remediation_api_url.as_ref())?;
        let api_key = require_secret("REMEDIATION_API_KEY", config.remediation_api_key.as_deref())?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Returns the submission endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemediationProvider for RemediationClient {
    async fn submit(&self, request: &SubmissionRequest) -> remedy_core::Result<SubmissionReceipt> {
        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %self.endpoint,
            source_url = %request.source_url,
            "Posting remediation submission"
        );

        let response = self
            .client
            .http()
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                source_url = %request.source_url,
                "Remediation API refused the submission"
            );
            return Err(submission_error(status));
        }

        let receipt: SubmissionReceipt = response.json().await.map_err(Error::from)?;
        if receipt.correlation_id.trim().is_empty() {
            return Err(remedy_core::Error::external_error()
                .with_message("remediation API returned an empty job id"));
        }

        Ok(receipt)
    }

    async fn fetch_artifact(&self, output_url: &Url) -> remedy_core::Result<Artifact> {
        tracing::debug!(
            target: TRACING_TARGET,
            output_url = %output_url,
            "Downloading remediated artifact"
        );

        let response = self
            .client
            .http()
            .get(output_url.clone())
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(remedy_core::Error::external_error()
                .with_message(format!("artifact download failed with status {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let content = response.bytes().await.map_err(Error::from)?;

        if content.is_empty() {
            return Err(remedy_core::Error::external_error()
                .with_message("remediated artifact is empty"));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            output_url = %output_url,
            size = content.len(),
            "Downloaded remediated artifact"
        );

        Ok(Artifact {
            content,
            content_type,
        })
    }
}
