//! Blob storage seam. Production uses S3 (or MinIO); tests use an in-memory store.

pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use s3::S3BlobStore;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("conditional write to s3://{bucket}/{key} was rejected")]
    Conflict { bucket: String, key: String },

    #[error("blob store unavailable: {0}")]
    Transport(String),
}

/// Object bytes plus the version tag (S3 ETag) used for conditional writes.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub version: Option<String>,
}

/// Precondition attached to a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    Unconditional,
    /// The key must not exist yet.
    Absent,
    /// The stored version must still be this one.
    Matches(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredBlob, BlobError>;

    /// Writes the object. Fails with `BlobError::Conflict` when `condition` does not hold.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        condition: WriteCondition,
    ) -> Result<(), BlobError>;
}
