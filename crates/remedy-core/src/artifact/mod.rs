//! Storage for remediated artifacts.

mod service;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
pub use service::ArtifactStore;

pub use crate::{Error, Result};

/// Tracing target for artifact storage operations.
pub const TRACING_TARGET: &str = "remedy_core::artifact";

/// Location of a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArtifact {
    /// Key under which the content can be read back.
    pub storage_key: String,
    /// Number of bytes written.
    pub size: u64,
}

/// Core trait for artifact storage implementations.
#[async_trait::async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Writes `content` under `key`, replacing any existing object.
    async fn put(&self, key: &str, content: Bytes) -> Result<StoredArtifact>;

    /// Removes the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<()>;
}
