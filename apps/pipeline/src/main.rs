mod aggregate;
mod anonymize;
mod config;
mod db;
mod errors;
mod extraction;
mod identity;
mod llm_client;
mod models;
mod pipeline;
mod retry;
mod routes;
mod skills;
mod state;
mod storage;
mod taxonomy;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::aggregate::AggregationMerger;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::extraction::Extractor;
use crate::identity::{IdentityResolver, PgIdentityStore};
use crate::llm_client::LlmClient;
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::retry::RetryPolicy;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3BlobStore;
use crate::taxonomy::SkillTaxonomy;

/// Base delay between optimistic-concurrency retries against the stores.
const CONFLICT_BACKOFF: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume pipeline v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (identity store)
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (region: {})", config.aws_region);

    // Initialize LLM client
    let request_timeout = Duration::from_secs(config.oracle_timeout_secs);
    let llm = LlmClient::new(config.anthropic_api_key.clone(), request_timeout)?;
    let oracle_budget = llm_client::call_budget(request_timeout);
    info!(
        "LLM client initialized (model: {}, call budget: {:?})",
        llm_client::MODEL,
        oracle_budget
    );

    // Load skill taxonomy
    let taxonomy = match &config.skill_taxonomy_path {
        Some(path) => SkillTaxonomy::load(path)?,
        None => SkillTaxonomy::builtin()?,
    };
    info!(
        "Skill taxonomy loaded: {} terms, {} compound overrides",
        taxonomy.len(),
        taxonomy.compounds().len()
    );
    if taxonomy.is_empty() {
        warn!("Skill taxonomy is empty; no skills will be matched");
    }

    let retry = RetryPolicy::new(config.store_conflict_retries, CONFLICT_BACKOFF);
    let blobs = Arc::new(S3BlobStore::new(s3));
    let pipeline = Pipeline::new(
        blobs.clone(),
        Extractor::new(Arc::new(llm), oracle_budget),
        IdentityResolver::new(Arc::new(PgIdentityStore::new(db)), retry),
        AggregationMerger::new(blobs, retry),
        Arc::new(taxonomy),
        PipelineSettings {
            output_bucket: config.output_bucket.clone(),
            collection_key: config.collection_key.clone(),
            anonymized_collection_key: config.anonymized_collection_key.clone(),
            anonymize_on_ingest: config.anonymize_on_ingest,
        },
    );

    // Build router
    let app = build_router(AppState { pipeline }).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client for MinIO (local, static credentials + endpoint) or AWS
/// (default provider chain).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.aws_region.clone()));

    if let (Some(key_id), Some(secret)) = (&config.aws_access_key_id, &config.aws_secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "pipeline-static",
        ));
    }
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let shared = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        // MinIO and most local endpoints only serve path-style requests
        .force_path_style(config.s3_endpoint.is_some())
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
