use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use crate::storage::{BlobError, BlobStore, WriteCondition, JSON_CONTENT_TYPE};

/// Appends records to a JSON-array collection with compare-and-swap writes.
///
/// Each attempt reads the collection and its version tag, appends, and writes back only if
/// the version is unchanged (or, on bootstrap, only if the key still does not exist).
/// A rejected write re-reads and retries with backoff; no append is ever silently lost.
#[derive(Clone)]
pub struct AggregationMerger {
    blobs: Arc<dyn BlobStore>,
    retry: RetryPolicy,
}

impl AggregationMerger {
    pub fn new(blobs: Arc<dyn BlobStore>, retry: RetryPolicy) -> Self {
        Self { blobs, retry }
    }

    /// Appends one record. Returns the collection size after the merge.
    pub async fn append<T>(&self, bucket: &str, key: &str, record: &T) -> Result<usize, PipelineError>
    where
        T: Serialize + Sync,
    {
        self.append_all(bucket, key, std::slice::from_ref(record))
            .await
    }

    /// Appends a batch in one merge, preserving both prior order and batch order.
    pub async fn append_all<T>(
        &self,
        bucket: &str,
        key: &str,
        records: &[T],
    ) -> Result<usize, PipelineError>
    where
        T: Serialize + Sync,
    {
        let new_items = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PipelineError::Internal(e.into()))?;

        for attempt in 0..self.retry.max_attempts {
            self.retry.wait(attempt).await;

            let (mut items, condition) = match self.blobs.get(bucket, key).await {
                Ok(blob) => (
                    parse_collection(&blob.bytes, key)?,
                    blob.version
                        .map(WriteCondition::Matches)
                        .unwrap_or(WriteCondition::Unconditional),
                ),
                Err(BlobError::NotFound { .. }) => {
                    info!("Collection s3://{bucket}/{key} does not exist yet, starting empty");
                    (Vec::new(), WriteCondition::Absent)
                }
                Err(e) => return Err(e.into()),
            };

            items.extend(new_items.iter().cloned());
            let body = serde_json::to_vec_pretty(&items).map_err(|e| PipelineError::Internal(e.into()))?;

            match self
                .blobs
                .put(bucket, key, Bytes::from(body), JSON_CONTENT_TYPE, condition)
                .await
            {
                Ok(()) => {
                    info!(
                        "Appended {} record(s) to s3://{bucket}/{key}; collection size {}",
                        new_items.len(),
                        items.len()
                    );
                    return Ok(items.len());
                }
                Err(BlobError::Conflict { .. }) => {
                    warn!(
                        "Collection s3://{bucket}/{key} changed concurrently (attempt {}/{}), retrying",
                        attempt + 1,
                        self.retry.max_attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PipelineError::StoreConflict {
            resource: format!("s3://{bucket}/{key}"),
            attempts: self.retry.max_attempts,
        })
    }
}

fn parse_collection(bytes: &[u8], key: &str) -> Result<Vec<Value>, PipelineError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(PipelineError::InputFormat(format!(
            "collection '{key}' is not a JSON array"
        ))),
        Err(e) => Err(PipelineError::InputFormat(format!(
            "collection '{key}' is not valid JSON: {e}"
        ))),
    }
}
