//! In-memory collaborators for exercising the pipeline without network or database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::aggregate::AggregationMerger;
use crate::extraction::Extractor;
use crate::identity::{IdentityResolver, IdentityStore, StoreError, UpsertOutcome};
use crate::llm_client::{CompletionOracle, OracleError};
use crate::models::IdentityRecord;
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::retry::RetryPolicy;
use crate::storage::{BlobError, BlobStore, StoredBlob, WriteCondition};
use crate::taxonomy::SkillTaxonomy;

pub const OUTPUT_BUCKET: &str = "processed";
pub const COLLECTION_KEY: &str = "candidates.json";
pub const ANONYMIZED_COLLECTION_KEY: &str = "anonymized_candidates.json";

/// A pipeline over the given fakes with the built-in taxonomy.
pub fn pipeline(
    blobs: Arc<MemoryBlobStore>,
    identities: Arc<MemoryIdentityStore>,
    oracle: Arc<dyn CompletionOracle>,
    anonymize_on_ingest: bool,
) -> Pipeline {
    let retry = RetryPolicy::new(3, Duration::from_millis(1));
    Pipeline::new(
        blobs.clone(),
        Extractor::new(oracle, Duration::from_secs(5)),
        IdentityResolver::new(identities, retry),
        AggregationMerger::new(blobs, retry),
        Arc::new(SkillTaxonomy::builtin().unwrap()),
        PipelineSettings {
            output_bucket: OUTPUT_BUCKET.to_string(),
            collection_key: COLLECTION_KEY.to_string(),
            anonymized_collection_key: ANONYMIZED_COLLECTION_KEY.to_string(),
            anonymize_on_ingest,
        },
    )
}

/// Versioned blob store. Every write bumps a version tag; conditional writes are honoured.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<(String, String), (Bytes, String)>>,
    next_version: AtomicU64,
    forced_conflicts: AtomicU32,
    failing_keys: Mutex<HashSet<String>>,
    put_delay_ms: AtomicU64,
    puts: AtomicU32,
}

impl MemoryBlobStore {
    pub fn insert(&self, bucket: &str, key: &str, bytes: &[u8]) {
        let version = self.bump();
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (Bytes::copy_from_slice(bytes), version),
        );
    }

    pub fn insert_json(&self, bucket: &str, key: &str, value: &Value) {
        self.insert(bucket, key, value.to_string().as_bytes());
    }

    pub fn read_json(&self, bucket: &str, key: &str) -> Option<Value> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|(bytes, _)| serde_json::from_slice(bytes).unwrap())
    }

    /// The next `n` conditional writes are rejected as if another writer got there first.
    pub fn force_conflicts(&self, n: u32) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    /// Writes to `key` (any bucket) fail with a transport error.
    pub fn fail_puts_to(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Every write sleeps for `delay` before it is applied.
    pub fn delay_puts(&self, delay: Duration) {
        self.put_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn clear_put_failures(&self) {
        self.failing_keys.lock().unwrap().clear();
    }

    /// Successful writes so far.
    pub fn puts(&self) -> u32 {
        self.puts.load(Ordering::SeqCst)
    }

    fn bump(&self) -> String {
        format!("\"v{}\"", self.next_version.fetch_add(1, Ordering::SeqCst))
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredBlob, BlobError> {
        // let concurrent writers interleave between read and write
        tokio::task::yield_now().await;
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|(bytes, version)| StoredBlob {
                bytes: bytes.clone(),
                version: Some(version.clone()),
            })
            .ok_or_else(|| BlobError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
        condition: WriteCondition,
    ) -> Result<(), BlobError> {
        let delay = self.put_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(BlobError::Transport(format!("injected failure for {key}")));
        }
        let conflict = || BlobError::Conflict {
            bucket: bucket.to_string(),
            key: key.to_string(),
        };
        if condition != WriteCondition::Unconditional && self.take_forced_conflict() {
            return Err(conflict());
        }

        let mut objects = self.objects.lock().unwrap();
        let id = (bucket.to_string(), key.to_string());
        let holds = match (&condition, objects.get(&id)) {
            (WriteCondition::Unconditional, _) => true,
            (WriteCondition::Absent, existing) => existing.is_none(),
            (WriteCondition::Matches(expected), Some((_, current))) => expected == current,
            (WriteCondition::Matches(_), None) => false,
        };
        if !holds {
            return Err(conflict());
        }

        let version = self.bump();
        objects.insert(id, (bytes, version));
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Identity store with the same conditional-put semantics as the Postgres backend.
#[derive(Default)]
pub struct MemoryIdentityStore {
    records: Mutex<HashMap<String, IdentityRecord>>,
    forced_conflicts: AtomicU32,
    racer: Mutex<Option<IdentityRecord>>,
    upserts: AtomicU32,
}

impl MemoryIdentityStore {
    pub fn get(&self, email: &str) -> Option<IdentityRecord> {
        self.records.lock().unwrap().get(email).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn force_conflicts(&self, n: u32) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    /// Stores `record` just before the next upsert runs, as a concurrent writer would.
    pub fn race_next_upsert(&self, record: IdentityRecord) {
        *self.racer.lock().unwrap() = Some(record);
    }

    /// Upsert calls that reached the store.
    pub fn upserts(&self) -> u32 {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn lookup(&self, email: &str) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self.get(email))
    }

    async fn upsert(
        &self,
        record: &IdentityRecord,
        expected_prior_hash: Option<&str>,
    ) -> Result<UpsertOutcome, StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        if let Some(winner) = self.racer.lock().unwrap().take() {
            records.insert(winner.email.clone(), winner);
        }
        if self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Ok(UpsertOutcome::Conflict);
        }

        let stored_hash = records.get(&record.email).map(|r| r.content_hash.clone());
        let outcome = match (expected_prior_hash, stored_hash) {
            (None, None) => {
                records.insert(record.email.clone(), record.clone());
                UpsertOutcome::Applied
            }
            (Some(prior), Some(hash)) if hash == prior => {
                if let Some(current) = records.get_mut(&record.email) {
                    current.content_hash = record.content_hash.clone();
                    current.last_updated = record.last_updated;
                }
                UpsertOutcome::Applied
            }
            _ => UpsertOutcome::Conflict,
        };
        Ok(outcome)
    }
}

/// Answers with the reply of the first rule whose needle occurs in the prompt.
#[derive(Default)]
pub struct ScriptedOracle {
    rules: Vec<(String, String)>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionOracle for ScriptedOracle {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .ok_or(OracleError::EmptyContent)
    }
}

/// Always fails like an unavailable API.
pub struct FailingOracle;

#[async_trait]
impl CompletionOracle for FailingOracle {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, OracleError> {
        Err(OracleError::Api {
            status: 503,
            message: "overloaded".to_string(),
        })
    }
}

/// Answers only after the given delay.
pub struct SlowOracle(pub Duration);

#[async_trait]
impl CompletionOracle for SlowOracle {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, OracleError> {
        tokio::time::sleep(self.0).await;
        Ok("Too Late".to_string())
    }
}
