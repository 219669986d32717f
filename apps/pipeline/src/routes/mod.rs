pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document ingestion
        .route(
            "/api/v1/documents/process",
            post(handlers::handle_process_document),
        )
        .route("/api/v1/documents/text", post(handlers::handle_process_text))
        .route("/api/v1/events/s3", post(handlers::handle_s3_event))
        // Collection maintenance
        .route(
            "/api/v1/collections/anonymize",
            post(handlers::handle_anonymize_collection),
        )
        .route(
            "/api/v1/collections/append",
            post(handlers::handle_append_collection),
        )
        .with_state(state)
}
