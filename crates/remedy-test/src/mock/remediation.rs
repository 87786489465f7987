//! Mock remediation service.

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use remedy_core::remediation::{
    Artifact, RemediationProvider, SubmissionReceipt, SubmissionRequest,
};
use remedy_core::{Error, ErrorKind, Result};
use url::Url;

#[derive(Debug, Default)]
struct State {
    issued: usize,
    submissions: Vec<Url>,
    downloads: Vec<Url>,
    failure: Option<ErrorKind>,
    artifact: Bytes,
}

/// Remediation provider that accepts every submission.
///
/// Correlation ids are issued as `uuid-1`, `uuid-2`, ... in submission order.
#[derive(Debug, Clone)]
pub struct MockRemediation {
    inner: Arc<Mutex<State>>,
}

impl Default for MockRemediation {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemediation {
    /// Creates a provider serving a small fake PDF.
    pub fn new() -> Self {
        let state = State {
            artifact: Bytes::from_static(b"%PDF-1.7 remediated"),
            ..State::default()
        };
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serves `content` for every artifact download.
    pub fn with_artifact(self, content: impl Into<Bytes>) -> Self {
        self.lock().artifact = content.into();
        self
    }

    /// Makes every following call fail with `kind`, or succeed with `None`.
    pub fn set_failure(&self, kind: Option<ErrorKind>) {
        self.lock().failure = kind;
    }

    /// Source URLs submitted so far.
    pub fn submissions(&self) -> Vec<Url> {
        self.lock().submissions.clone()
    }

    /// Artifact URLs downloaded so far.
    pub fn downloads(&self) -> Vec<Url> {
        self.lock().downloads.clone()
    }
}

#[async_trait::async_trait]
impl RemediationProvider for MockRemediation {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt> {
        let mut state = self.lock();
        if let Some(kind) = state.failure {
            return Err(Error::new(kind).with_message("mock remediation failure"));
        }

        state.issued += 1;
        state.submissions.push(request.source_url.clone());
        Ok(SubmissionReceipt {
            correlation_id: format!("uuid-{}", state.issued),
        })
    }

    async fn fetch_artifact(&self, output_url: &Url) -> Result<Artifact> {
        let mut state = self.lock();
        if let Some(kind) = state.failure {
            return Err(Error::new(kind).with_message("mock remediation failure"));
        }

        state.downloads.push(output_url.clone());
        Ok(Artifact {
            content: state.artifact.clone(),
            content_type: Some("application/pdf".to_owned()),
        })
    }
}
