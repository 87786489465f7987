//! Remediated artifact bucket backed by a NATS object store.

use std::sync::Arc;

use async_nats::jetstream;
use async_nats::jetstream::context::ObjectStoreErrorKind;
use async_nats::jetstream::object_store::{self, ObjectMetadata};
use bytes::Bytes;
use remedy_core::artifact::{ArtifactStorage, StoredArtifact};
use sha2::{Digest, Sha256};

use crate::{Error, Result, TRACING_TARGET_OBJECT};

/// Name of the bucket holding remediated files.
pub const ARTIFACT_BUCKET: &str = "remediated-files";

/// Object store bucket for remediated PDFs.
///
/// Objects never expire; each one is keyed by the id of the file resource
/// that references it.
#[derive(Clone)]
pub struct ArtifactBucket {
    inner: Arc<object_store::ObjectStore>,
}

impl ArtifactBucket {
    /// Opens the bucket, creating it when missing.
    pub async fn new(jetstream: &jetstream::Context) -> Result<Self> {
        let store = match jetstream.get_object_store(ARTIFACT_BUCKET).await {
            Ok(store) => store,
            Err(e) if matches!(e.kind(), ObjectStoreErrorKind::GetStore) => {
                tracing::info!(
                    target: TRACING_TARGET_OBJECT,
                    bucket = ARTIFACT_BUCKET,
                    "Creating artifact bucket"
                );

                let config = object_store::Config {
                    bucket: ARTIFACT_BUCKET.to_owned(),
                    description: Some("Auto-remediated PDF artifacts".to_owned()),
                    ..Default::default()
                };

                jetstream.create_object_store(config).await.map_err(|e| {
                    tracing::error!(
                        target: TRACING_TARGET_OBJECT,
                        bucket = ARTIFACT_BUCKET,
                        error = %e,
                        "Failed to create artifact bucket"
                    );
                    Error::operation("create_object_store", e)
                })?
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_OBJECT,
                    bucket = ARTIFACT_BUCKET,
                    error = %e,
                    "Failed to open artifact bucket"
                );
                return Err(Error::operation("get_object_store", e));
            }
        };

        Ok(Self {
            inner: Arc::new(store),
        })
    }

    /// Uploads `content` under `key` and returns the stored size.
    ///
    /// The hex SHA-256 of the content is kept as the object description.
    pub async fn upload(&self, key: &str, content: &[u8]) -> Result<u64> {
        let sha256 = hex::encode(Sha256::digest(content));
        let meta = ObjectMetadata {
            name: key.to_owned(),
            description: Some(format!("sha256:{sha256}")),
            ..Default::default()
        };

        let mut reader = content;
        let info = self.inner.put(meta, &mut reader).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_OBJECT,
                key = %key,
                error = %e,
                "Failed to upload artifact"
            );
            Error::operation("put", e)
        })?;

        tracing::info!(
            target: TRACING_TARGET_OBJECT,
            key = %key,
            size = info.size,
            sha256 = %sha256,
            "Artifact uploaded"
        );

        Ok(info.size as u64)
    }

    /// Deletes the object stored under `key`.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_OBJECT,
                key = %key,
                error = %e,
                "Failed to delete artifact"
            );
            Error::operation("delete", e)
        })?;

        tracing::info!(target: TRACING_TARGET_OBJECT, key = %key, "Artifact deleted");
        Ok(())
    }
}

impl std::fmt::Debug for ArtifactBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBucket")
            .field("bucket", &ARTIFACT_BUCKET)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ArtifactStorage for ArtifactBucket {
    async fn put(&self, key: &str, content: Bytes) -> remedy_core::Result<StoredArtifact> {
        let size = self.upload(key, &content).await?;
        Ok(StoredArtifact {
            storage_key: format!("{ARTIFACT_BUCKET}/{key}"),
            size,
        })
    }

    async fn delete(&self, key: &str) -> remedy_core::Result<()> {
        Ok(self.remove(key).await?)
    }
}
