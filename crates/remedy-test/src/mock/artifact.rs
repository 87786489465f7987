//! In-memory artifact storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use remedy_core::Result;
use remedy_core::artifact::{ArtifactStorage, StoredArtifact};

/// Artifact storage backed by a map.
#[derive(Debug, Default, Clone)]
pub struct MemoryArtifacts {
    inner: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl MemoryArtifacts {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the content stored under `key`.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.lock().get(key).cloned()
    }

    /// Number of stored artifacts.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing was stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait::async_trait]
impl ArtifactStorage for MemoryArtifacts {
    async fn put(&self, key: &str, content: Bytes) -> Result<StoredArtifact> {
        let size = content.len() as u64;
        self.lock().insert(key.to_owned(), content);
        Ok(StoredArtifact {
            storage_key: key.to_owned(),
            size,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
