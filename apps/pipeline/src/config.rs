use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub output_bucket: String,
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub anthropic_api_key: String,
    pub collection_key: String,
    pub anonymized_collection_key: String,
    pub anonymize_on_ingest: bool,
    pub oracle_timeout_secs: u64,
    pub store_conflict_retries: u32,
    pub skill_taxonomy_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            output_bucket: require_env("OUTPUT_BUCKET")?,
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_region: env_or("AWS_REGION", "us-east-1"),
            aws_access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            collection_key: env_or("COLLECTION_KEY", "candidates.json"),
            anonymized_collection_key: env_or(
                "ANONYMIZED_COLLECTION_KEY",
                "anonymized_candidates.json",
            ),
            anonymize_on_ingest: parse_env("ANONYMIZE_ON_INGEST", false)?,
            oracle_timeout_secs: parse_env("ORACLE_TIMEOUT_SECS", 20)?,
            store_conflict_retries: parse_env("STORE_CONFLICT_RETRIES", 3)?,
            skill_taxonomy_path: optional_env("SKILL_TAXONOMY_PATH").map(PathBuf::from),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'"))
}
