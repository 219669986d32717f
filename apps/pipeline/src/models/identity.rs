use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted identity of a known candidate, keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub email: String,
    pub candidate_id: String,
    pub content_hash: String,
    pub last_updated: DateTime<Utc>,
}
