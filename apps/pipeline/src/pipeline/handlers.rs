use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::PipelineError;
use crate::pipeline::events::S3Event;
use crate::pipeline::{AppendOutcome, BatchOutcome, DocumentRef, ProcessOutcome, RawDocument};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    pub source_key: String,
    pub text: String,
}

/// POST /api/v1/documents/process
pub async fn handle_process_document(
    State(state): State<AppState>,
    Json(doc): Json<DocumentRef>,
) -> Result<Json<ProcessOutcome>, PipelineError> {
    Ok(Json(state.pipeline.process_document(&doc).await?))
}

/// POST /api/v1/documents/text
pub async fn handle_process_text(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<ProcessOutcome>, PipelineError> {
    let outcome = state
        .pipeline
        .process_text(RawDocument {
            source_key: req.source_key,
            text: req.text,
        })
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/events/s3
pub async fn handle_s3_event(
    State(state): State<AppState>,
    Json(event): Json<Value>,
) -> Result<Json<ProcessOutcome>, PipelineError> {
    let doc = S3Event::from_value(event)?.first_document()?;
    Ok(Json(state.pipeline.process_document(&doc).await?))
}

/// POST /api/v1/collections/anonymize
pub async fn handle_anonymize_collection(
    State(state): State<AppState>,
    Json(doc): Json<DocumentRef>,
) -> Result<Json<BatchOutcome>, PipelineError> {
    Ok(Json(state.pipeline.anonymize_collection(&doc).await?))
}

/// POST /api/v1/collections/append
pub async fn handle_append_collection(
    State(state): State<AppState>,
    Json(doc): Json<DocumentRef>,
) -> Result<Json<AppendOutcome>, PipelineError> {
    Ok(Json(state.pipeline.append_profile_document(&doc).await?))
}
