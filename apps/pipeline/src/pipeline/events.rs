use serde::Deserialize;
use serde_json::Value;

use crate::errors::PipelineError;
use crate::pipeline::DocumentRef;

/// Object-created notification as delivered by S3 event wiring.
#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records")]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    /// URL-encoded, with spaces as `+`.
    pub key: String,
}

impl S3Event {
    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        serde_json::from_value(value)
            .map_err(|e| PipelineError::InputFormat(format!("not an S3 event notification: {e}")))
    }

    /// The document named by the first record, with its key decoded.
    pub fn first_document(&self) -> Result<DocumentRef, PipelineError> {
        let record = self
            .records
            .first()
            .ok_or_else(|| PipelineError::InputFormat("S3 event has no records".to_string()))?;
        Ok(DocumentRef {
            bucket: record.s3.bucket.name.clone(),
            key: decode_object_key(&record.s3.object.key)?,
        })
    }
}

pub fn decode_object_key(raw: &str) -> Result<String, PipelineError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|key| key.into_owned())
        .map_err(|e| PipelineError::InputFormat(format!("object key is not valid UTF-8: {e}")))
}
