use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::PipelineError;
use crate::identity::ids::mint_candidate_id;
use crate::identity::store::{IdentityStore, StoreError, UpsertOutcome};
use crate::models::IdentityRecord;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionAction {
    Create,
    Update,
    Skip,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub candidate_id: String,
    pub action: ResolutionAction,
    /// Stored hash before this resolution wrote; `None` for a fresh identity.
    pub previous_hash: Option<String>,
    /// The record as it stands in the store after resolution.
    pub record: IdentityRecord,
}

/// Decides CREATE / UPDATE / SKIP for a document and claims the identity record.
///
/// Writes are conditional, so two concurrent submissions for an unseen email can never
/// mint two candidate IDs: the loser of the create re-reads and becomes an UPDATE or SKIP.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn IdentityStore>,
    retry: RetryPolicy,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn IdentityStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Read-only check: the stored record when this exact content was already processed.
    pub async fn precheck(
        &self,
        email: &str,
        fingerprint: &str,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self
            .store
            .lookup(email)
            .await?
            .filter(|record| record.content_hash == fingerprint))
    }

    pub async fn resolve(
        &self,
        email: &str,
        fingerprint: &str,
        now: DateTime<Utc>,
    ) -> Result<Resolution, PipelineError> {
        for attempt in 0..self.retry.max_attempts {
            self.retry.wait(attempt).await;

            let existing = self.store.lookup(email).await?;
            let (record, expected, action) = match existing {
                Some(current) if current.content_hash == fingerprint => {
                    debug!("Identity {email} unchanged, skipping");
                    return Ok(Resolution {
                        candidate_id: current.candidate_id.clone(),
                        action: ResolutionAction::Skip,
                        previous_hash: Some(current.content_hash.clone()),
                        record: current,
                    });
                }
                Some(current) => {
                    let prior = current.content_hash.clone();
                    let record = IdentityRecord {
                        content_hash: fingerprint.to_string(),
                        last_updated: now,
                        ..current
                    };
                    (record, Some(prior), ResolutionAction::Update)
                }
                None => {
                    let candidate_id = mint_candidate_id(&mut rand::thread_rng(), now);
                    let record = IdentityRecord {
                        email: email.to_string(),
                        candidate_id,
                        content_hash: fingerprint.to_string(),
                        last_updated: now,
                    };
                    (record, None, ResolutionAction::Create)
                }
            };

            match self.store.upsert(&record, expected.as_deref()).await? {
                UpsertOutcome::Applied => {
                    info!(
                        "Identity resolved: {:?} candidate {}",
                        action, record.candidate_id
                    );
                    return Ok(Resolution {
                        candidate_id: record.candidate_id.clone(),
                        action,
                        previous_hash: expected,
                        record,
                    });
                }
                UpsertOutcome::Conflict => {
                    warn!(
                        "Identity write conflict (attempt {}/{}), re-reading",
                        attempt + 1,
                        self.retry.max_attempts
                    );
                }
            }
        }

        Err(PipelineError::StoreConflict {
            resource: "candidate identity".to_string(),
            attempts: self.retry.max_attempts,
        })
    }

    /// Undoes the hash claim of a CREATE or UPDATE whose later writes failed.
    ///
    /// The record keeps its candidate ID, so redelivery of the same document resolves as
    /// an UPDATE under that ID instead of being skipped. A fresh claim is reset to an empty
    /// hash. A no-op for SKIP, or when another writer has moved the record on since.
    pub async fn release(&self, resolution: &Resolution) -> Result<(), StoreError> {
        if resolution.action == ResolutionAction::Skip {
            return Ok(());
        }
        let restored = IdentityRecord {
            content_hash: resolution.previous_hash.clone().unwrap_or_default(),
            ..resolution.record.clone()
        };
        let outcome = self
            .store
            .upsert(&restored, Some(&resolution.record.content_hash))
            .await?;
        if outcome == UpsertOutcome::Conflict {
            warn!(
                "Identity claim for {} was superseded before release",
                resolution.candidate_id
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::MemoryIdentityStore;

    fn resolver(store: Arc<MemoryIdentityStore>) -> IdentityResolver {
        IdentityResolver::new(store, RetryPolicy::new(3, Duration::from_millis(10)))
    }

    #[tokio::test]
    async fn test_create_then_skip_then_update() {
        let store = Arc::new(MemoryIdentityStore::default());
        let resolver = resolver(store.clone());
        let now = Utc::now();

        let first = resolver.resolve("jane@example.com", "h1", now).await.unwrap();
        assert_eq!(first.action, ResolutionAction::Create);
        assert!(first.candidate_id.starts_with('R'));
        assert_eq!(first.previous_hash, None);

        let again = resolver.resolve("jane@example.com", "h1", now).await.unwrap();
        assert_eq!(again.action, ResolutionAction::Skip);
        assert_eq!(again.candidate_id, first.candidate_id);

        let later = now + chrono::Duration::days(1);
        let changed = resolver
            .resolve("jane@example.com", "h2", later)
            .await
            .unwrap();
        assert_eq!(changed.action, ResolutionAction::Update);
        assert_eq!(changed.candidate_id, first.candidate_id);
        assert_eq!(changed.previous_hash.as_deref(), Some("h1"));

        let stored = store.get("jane@example.com").unwrap();
        assert_eq!(stored.content_hash, "h2");
        assert_eq!(stored.last_updated, later);
        assert_eq!(stored.candidate_id, first.candidate_id);
    }

    #[tokio::test]
    async fn test_precheck_is_read_only() {
        let store = Arc::new(MemoryIdentityStore::default());
        let resolver = resolver(store.clone());
        assert!(resolver.precheck("a@b.com", "h").await.unwrap().is_none());
        assert_eq!(store.upserts(), 0);

        resolver.resolve("a@b.com", "h", Utc::now()).await.unwrap();
        assert!(resolver.precheck("a@b.com", "h").await.unwrap().is_some());
        assert!(resolver.precheck("a@b.com", "other").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_create_race_reuses_winner_id() {
        let store = Arc::new(MemoryIdentityStore::default());
        let winner = IdentityRecord {
            email: "jane@example.com".to_string(),
            candidate_id: "R2026-AAAA-BBBB-CCCC".to_string(),
            content_hash: "theirs".to_string(),
            last_updated: Utc::now(),
        };
        store.race_next_upsert(winner);

        let resolution = resolver(store.clone())
            .resolve("jane@example.com", "mine", Utc::now())
            .await
            .unwrap();
        assert_eq!(resolution.action, ResolutionAction::Update);
        assert_eq!(resolution.candidate_id, "R2026-AAAA-BBBB-CCCC");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_conflict_surfaces() {
        let store = Arc::new(MemoryIdentityStore::default());
        store.force_conflicts(10);
        let err = resolver(store)
            .resolve("jane@example.com", "h", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::StoreConflict { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_release_reopens_fresh_claim() {
        let store = Arc::new(MemoryIdentityStore::default());
        let resolver = resolver(store.clone());
        let created = resolver.resolve("jane@example.com", "h1", Utc::now()).await.unwrap();

        resolver.release(&created).await.unwrap();
        assert_eq!(store.get("jane@example.com").unwrap().content_hash, "");

        let redelivered = resolver.resolve("jane@example.com", "h1", Utc::now()).await.unwrap();
        assert_eq!(redelivered.action, ResolutionAction::Update);
        assert_eq!(redelivered.candidate_id, created.candidate_id);
    }

    #[tokio::test]
    async fn test_release_restores_prior_hash_after_update() {
        let store = Arc::new(MemoryIdentityStore::default());
        let resolver = resolver(store.clone());
        resolver.resolve("jane@example.com", "h1", Utc::now()).await.unwrap();
        let updated = resolver.resolve("jane@example.com", "h2", Utc::now()).await.unwrap();

        resolver.release(&updated).await.unwrap();
        assert_eq!(store.get("jane@example.com").unwrap().content_hash, "h1");
    }
}
