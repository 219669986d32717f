use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The pipeline carries its collaborators (blob store, identity store, oracle) as trait
/// objects, so tests build the same state over in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}
