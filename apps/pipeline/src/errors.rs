use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::identity::store::StoreError;
use crate::storage::BlobError;

/// Failure of one pipeline invocation.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, PipelineError>`.
///
/// Oracle failures never appear here: the extractor degrades them to sentinel values.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("No email address found in '{0}'; cannot resolve candidate identity")]
    MissingIdentityKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Concurrent write conflict on '{resource}' after {attempts} attempt(s)")]
    StoreConflict { resource: String, attempts: u32 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InputFormat(_) => "INPUT_FORMAT_ERROR",
            PipelineError::MissingIdentityKey(_) => "MISSING_IDENTITY_KEY",
            PipelineError::NotFound(_) => "NOT_FOUND",
            PipelineError::StoreConflict { .. } => "STORE_CONFLICT",
            PipelineError::Transport(_) => "TRANSPORT_ERROR",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            PipelineError::InputFormat(_) => StatusCode::BAD_REQUEST,
            PipelineError::MissingIdentityKey(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::StoreConflict { .. } => StatusCode::CONFLICT,
            PipelineError::Transport(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BlobError> for PipelineError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound { bucket, key } => {
                PipelineError::NotFound(format!("s3://{bucket}/{key}"))
            }
            BlobError::Conflict { bucket, key } => PipelineError::StoreConflict {
                resource: format!("s3://{bucket}/{key}"),
                attempts: 1,
            },
            BlobError::Transport(msg) => PipelineError::Transport(msg),
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::Transport(err.to_string())
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let message = match &self {
            PipelineError::Transport(msg) => {
                tracing::error!("Transport error: {msg}");
                "A storage backend could not be reached".to_string()
            }
            PipelineError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
            other => {
                tracing::warn!("Invocation failed: {other}");
                other.to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}
