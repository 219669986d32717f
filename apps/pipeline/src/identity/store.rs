//! Identity store: one `IdentityRecord` per known email.
//!
//! Implement `IdentityStore` to swap backends. Carried as `Arc<dyn IdentityStore>`.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::IdentityRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity store unavailable: {0}")]
    Transport(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Applied,
    /// The stored state did not match the expectation; nothing was written.
    Conflict,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn lookup(&self, email: &str) -> Result<Option<IdentityRecord>, StoreError>;

    /// Conditional put keyed by `record.email`.
    ///
    /// `expected_prior_hash = None` creates the record only if no record exists.
    /// `Some(h)` replaces hash and timestamp only if the stored hash is still `h`;
    /// the stored `candidate_id` is never changed by an update.
    async fn upsert(
        &self,
        record: &IdentityRecord,
        expected_prior_hash: Option<&str>,
    ) -> Result<UpsertOutcome, StoreError>;
}

/// Postgres-backed identity store over the `candidate_identities` table.
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn lookup(&self, email: &str) -> Result<Option<IdentityRecord>, StoreError> {
        let record: Option<IdentityRecord> = sqlx::query_as(
            "SELECT email, candidate_id, content_hash, last_updated \
             FROM candidate_identities WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn upsert(
        &self,
        record: &IdentityRecord,
        expected_prior_hash: Option<&str>,
    ) -> Result<UpsertOutcome, StoreError> {
        let result = match expected_prior_hash {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO candidate_identities (email, candidate_id, content_hash, last_updated)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (email) DO NOTHING
                    "#,
                )
                .bind(&record.email)
                .bind(&record.candidate_id)
                .bind(&record.content_hash)
                .bind(record.last_updated)
                .execute(&self.pool)
                .await?
            }
            Some(prior) => {
                sqlx::query(
                    r#"
                    UPDATE candidate_identities
                    SET content_hash = $2, last_updated = $3
                    WHERE email = $1 AND content_hash = $4
                    "#,
                )
                .bind(&record.email)
                .bind(&record.content_hash)
                .bind(record.last_updated)
                .bind(prior)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(if result.rows_affected() == 1 {
            UpsertOutcome::Applied
        } else {
            UpsertOutcome::Conflict
        })
    }
}
