use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use crate::storage::{BlobError, BlobStore, StoredBlob, WriteCondition};

/// `BlobStore` over an S3-compatible endpoint. Conditional writes map onto
/// `If-None-Match: *` and `If-Match: <etag>`.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn status_of<E>(err: &SdkError<E, HttpResponse>) -> Option<u16> {
    err.raw_response().map(|r| r.status().as_u16())
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredBlob, BlobError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_key())
                    || status_of(&err) == Some(404);
                if missing {
                    return Err(BlobError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                return Err(BlobError::Transport(format!(
                    "GET s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&err)
                )));
            }
        };

        let version = output.e_tag().map(String::from);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| BlobError::Transport(format!("reading s3://{bucket}/{key}: {e}")))?
            .into_bytes();

        debug!("Read {} bytes from s3://{bucket}/{key}", bytes.len());
        Ok(StoredBlob { bytes, version })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        condition: WriteCondition,
    ) -> Result<(), BlobError> {
        let size = bytes.len();
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type);

        request = match condition {
            WriteCondition::Unconditional => request,
            WriteCondition::Absent => request.if_none_match("*"),
            WriteCondition::Matches(etag) => request.if_match(etag),
        };

        match request.send().await {
            Ok(_) => {
                debug!("Wrote {size} bytes to s3://{bucket}/{key}");
                Ok(())
            }
            Err(err) if matches!(status_of(&err), Some(409 | 412)) => Err(BlobError::Conflict {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(err) => Err(BlobError::Transport(format!(
                "PUT s3://{bucket}/{key}: {}",
                DisplayErrorContext(&err)
            ))),
        }
    }
}
