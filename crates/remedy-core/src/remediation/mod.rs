//! Remediation service boundary.
//!
//! - [`RemediationProvider`]: submits files and downloads remediated artifacts
//! - [`RemediationService`]: service wrapper with observability
//! - [`Unconfigured`]: provider used when no remediation endpoint is configured
//!
//! For the HTTP implementation, see the `remedy-reqwest` crate.

mod service;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
pub use service::RemediationService;
use url::Url;

pub use crate::{Error, Result};

/// Tracing target for remediation service operations.
pub const TRACING_TARGET: &str = "remedy_core::remediation";

/// Request to remediate one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// Publicly resolvable URL of the source file.
    pub source_url: Url,
}

impl SubmissionRequest {
    /// Creates a new submission request.
    pub fn new(source_url: Url) -> Self {
        Self { source_url }
    }
}

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Correlation id issued by the remediation service.
    #[serde(rename = "uuid")]
    pub correlation_id: String,
}

/// A downloaded remediated artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Raw content.
    pub content: Bytes,
    /// Content type reported by the server.
    pub content_type: Option<String>,
}

/// Core trait for remediation service implementations.
#[async_trait::async_trait]
pub trait RemediationProvider: Send + Sync {
    /// Submits a file for remediation and returns the issued correlation id.
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt>;

    /// Downloads the artifact produced by a successful job.
    async fn fetch_artifact(&self, output_url: &Url) -> Result<Artifact>;
}

/// Provider injected when the remediation endpoint or key is not configured.
///
/// Every call fails with a [`Configuration`] error.
///
/// [`Configuration`]: crate::ErrorKind::Configuration
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

impl Unconfigured {
    fn error() -> Error {
        Error::configuration().with_message("remediation endpoint and API key are not configured")
    }
}

#[async_trait::async_trait]
impl RemediationProvider for Unconfigured {
    async fn submit(&self, _request: &SubmissionRequest) -> Result<SubmissionReceipt> {
        Err(Self::error())
    }

    async fn fetch_artifact(&self, _output_url: &Url) -> Result<Artifact> {
        Err(Self::error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn unconfigured_provider_fails_with_configuration_error() -> anyhow::Result<()> {
        let service = RemediationService::new(Unconfigured);
        let request = SubmissionRequest::new(Url::parse("https://repo.example.com/files/1")?);

        let error = service.submit(&request).await.expect_err("must fail");
        assert_eq!(error.kind, ErrorKind::Configuration);
        Ok(())
    }

    #[test]
    fn receipt_reads_uuid_field() -> anyhow::Result<()> {
        let receipt: SubmissionReceipt = serde_json::from_str(r#"{"uuid":"uuid-1"}"#)?;
        assert_eq!(receipt.correlation_id, "uuid-1");
        Ok(())
    }
}
