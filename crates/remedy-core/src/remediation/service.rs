//! Remediation service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use url::Url;

use super::{
    Artifact, RemediationProvider, Result, SubmissionReceipt, SubmissionRequest, TRACING_TARGET,
};

/// Remediation service wrapper with observability.
///
/// The inner provider is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct RemediationService {
    inner: Arc<dyn RemediationProvider>,
}

impl fmt::Debug for RemediationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemediationService").finish_non_exhaustive()
    }
}

impl RemediationService {
    /// Create a new remediation service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: RemediationProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Submits a file for remediation.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            source_url = %request.source_url,
            "Submitting file for remediation"
        );

        let result = self.inner.submit(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(receipt) => tracing::info!(
                target: TRACING_TARGET,
                source_url = %request.source_url,
                correlation_id = %receipt.correlation_id,
                elapsed_ms = elapsed.as_millis(),
                "Remediation job accepted"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                source_url = %request.source_url,
                error = %error,
                retryable = error.is_retryable(),
                elapsed_ms = elapsed.as_millis(),
                "Remediation submission failed"
            ),
        }

        result
    }

    /// Downloads a remediated artifact.
    pub async fn fetch_artifact(&self, output_url: &Url) -> Result<Artifact> {
        let started_at = Instant::now();
        let result = self.inner.fetch_artifact(output_url).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(artifact) => tracing::debug!(
                target: TRACING_TARGET,
                output_url = %output_url,
                size = artifact.content.len(),
                elapsed_ms = elapsed.as_millis(),
                "Remediated artifact downloaded"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                output_url = %output_url,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Remediated artifact download failed"
            ),
        }

        result
    }
}
