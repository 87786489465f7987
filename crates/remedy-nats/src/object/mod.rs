//! Object storage for remediated artifacts.

mod artifact_bucket;

pub use artifact_bucket::{ARTIFACT_BUCKET, ArtifactBucket};
