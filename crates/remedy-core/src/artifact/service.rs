//! Artifact storage wrapper with observability.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::{ArtifactStorage, Result, StoredArtifact, TRACING_TARGET};

/// Artifact storage wrapper with observability.
#[derive(Clone)]
pub struct ArtifactStore {
    inner: Arc<dyn ArtifactStorage>,
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore").finish_non_exhaustive()
    }
}

impl ArtifactStore {
    /// Create a new artifact store wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: ArtifactStorage + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Writes an artifact.
    pub async fn put(&self, key: &str, content: Bytes) -> Result<StoredArtifact> {
        let size = content.len();
        let result = self.inner.put(key, content).await;

        match &result {
            Ok(stored) => tracing::debug!(
                target: TRACING_TARGET,
                key = %key,
                storage_key = %stored.storage_key,
                size,
                "Artifact stored"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                key = %key,
                size,
                error = %error,
                "Failed to store artifact"
            ),
        }

        result
    }

    /// Removes an artifact that no file resource references.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let result = self.inner.delete(key).await;

        match &result {
            Ok(()) => tracing::debug!(target: TRACING_TARGET, key = %key, "Artifact deleted"),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                key = %key,
                error = %error,
                "Failed to delete artifact"
            ),
        }

        result
    }
}
