//! One pipeline invocation: raw text → extraction → classification → identity resolution
//! → profile assembly → persisted outputs.
//!
//! Extraction, classification and oracle calls write nothing. Writes happen in a fixed
//! order once the identity is claimed: per-document output, collection, anonymized
//! collection. If any of them fails the identity claim is released so that redelivery
//! reprocesses the document instead of skipping it. The writes keep running when the
//! caller abandons the invocation.

pub mod events;
pub mod handlers;

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::aggregate::AggregationMerger;
use crate::anonymize::anonymize;
use crate::errors::PipelineError;
use crate::extraction::{extract_email, Extractor};
use crate::identity::{content_fingerprint, IdentityResolver, Resolution, ResolutionAction};
use crate::models::{CandidateProfile, ContactInfo, LanguagesSpoken, SkillLists};
use crate::skills::{classify, ClassifiedSkills, SkillSummary};
use crate::storage::{BlobStore, WriteCondition, JSON_CONTENT_TYPE};
use crate::taxonomy::{SkillCategory, SkillTaxonomy};

/// Where pipeline outputs go.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub output_bucket: String,
    pub collection_key: String,
    pub anonymized_collection_key: String,
    pub anonymize_on_ingest: bool,
}

/// A stored object to run through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentRef {
    pub bucket: String,
    pub key: String,
}

/// Résumé text plus the key it came from. Owned by the caller for one invocation.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source_key: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillReport {
    pub skills: ClassifiedSkills,
    pub summary: SkillSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub invocation_id: Uuid,
    pub status: ResolutionAction,
    pub candidate_id: String,
    pub source_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymized_collection_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CandidateProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_report: Option<SkillReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub invocation_id: Uuid,
    pub status: &'static str,
    pub source_key: String,
    pub anonymized: usize,
    pub collection_size: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendOutcome {
    pub invocation_id: Uuid,
    pub status: &'static str,
    pub source_key: String,
    pub collection_size: usize,
}

#[derive(Clone)]
pub struct Pipeline {
    blobs: Arc<dyn BlobStore>,
    extractor: Extractor,
    resolver: IdentityResolver,
    merger: AggregationMerger,
    taxonomy: Arc<SkillTaxonomy>,
    settings: Arc<PipelineSettings>,
}

impl Pipeline {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        extractor: Extractor,
        resolver: IdentityResolver,
        merger: AggregationMerger,
        taxonomy: Arc<SkillTaxonomy>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            blobs,
            extractor,
            resolver,
            merger,
            taxonomy,
            settings: Arc::new(settings),
        }
    }

    /// Reads a plain-text résumé from storage and processes it.
    pub async fn process_document(&self, doc: &DocumentRef) -> Result<ProcessOutcome, PipelineError> {
        let blob = self.blobs.get(&doc.bucket, &doc.key).await?;
        let text = String::from_utf8(blob.bytes.to_vec()).map_err(|_| {
            PipelineError::InputFormat(format!("s3://{}/{} is not UTF-8 text", doc.bucket, doc.key))
        })?;
        self.process_text(RawDocument {
            source_key: doc.key.clone(),
            text,
        })
        .await
    }

    pub async fn process_text(&self, doc: RawDocument) -> Result<ProcessOutcome, PipelineError> {
        let invocation_id = Uuid::new_v4();
        info!(
            "[{invocation_id}] Processing '{}' ({} bytes)",
            doc.source_key,
            doc.text.len()
        );

        let email = extract_email(&doc.text)
            .ok_or_else(|| PipelineError::MissingIdentityKey(doc.source_key.clone()))?;
        debug!("[{invocation_id}] Identity key {email}");
        let fingerprint = content_fingerprint(&doc.text);

        if let Some(existing) = self.resolver.precheck(&email, &fingerprint).await? {
            info!(
                "[{invocation_id}] Unchanged résumé for candidate {}, skipping",
                existing.candidate_id
            );
            return Ok(skipped(invocation_id, doc.source_key, existing.candidate_id));
        }

        let (contact, experience_summary, is_post_graduate) = tokio::join!(
            self.extractor.extract(&doc.text),
            self.extractor.experience_summary(&doc.text),
            self.extractor.is_post_graduate(&doc.text),
        );
        let skills = classify(&doc.text, &self.taxonomy);
        info!(
            "[{invocation_id}] Extraction complete: {} skill(s) matched",
            skills.summary().total_unique_skills
        );

        let now = Utc::now();
        let resolution = self.resolver.resolve(&email, &fingerprint, now).await?;
        if resolution.action == ResolutionAction::Skip {
            return Ok(skipped(invocation_id, doc.source_key, resolution.candidate_id));
        }

        let profile = assemble_profile(
            &resolution.candidate_id,
            contact,
            &email,
            &skills,
            experience_summary,
            is_post_graduate,
            now,
        );

        let written = self
            .persist_claimed(
                invocation_id,
                doc.source_key.clone(),
                profile.clone(),
                resolution.clone(),
            )
            .await?;

        info!(
            "[{invocation_id}] {:?} candidate {} written to {}",
            resolution.action, resolution.candidate_id, written.output_key
        );

        Ok(ProcessOutcome {
            invocation_id,
            status: resolution.action,
            candidate_id: resolution.candidate_id,
            source_key: doc.source_key,
            output_key: Some(written.output_key),
            collection_size: Some(written.collection_size),
            anonymized_collection_size: written.anonymized_collection_size,
            profile: Some(profile),
            skill_report: Some(SkillReport {
                summary: skills.summary(),
                skills,
            }),
        })
    }

    /// Anonymizes a stored JSON list of profiles and appends the batch in one merge.
    pub async fn anonymize_collection(&self, doc: &DocumentRef) -> Result<BatchOutcome, PipelineError> {
        let invocation_id = Uuid::new_v4();
        let value = self.read_json(doc).await?;
        let Value::Array(items) = value else {
            return Err(PipelineError::InputFormat(format!(
                "'{}' must contain a JSON list of candidates",
                doc.key
            )));
        };

        let profiles = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<CandidateProfile>(item).map_err(|e| {
                    PipelineError::InputFormat(format!("candidate #{i} in '{}': {e}", doc.key))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!("[{invocation_id}] Anonymizing {} candidate(s) from '{}'", profiles.len(), doc.key);

        let anonymized: Vec<_> = {
            let mut rng = rand::thread_rng();
            profiles.iter().map(|p| anonymize(p, &mut rng)).collect()
        };

        let collection_size = self
            .merger
            .append_all(
                &self.settings.output_bucket,
                &self.settings.anonymized_collection_key,
                &anonymized,
            )
            .await?;

        Ok(BatchOutcome {
            invocation_id,
            status: "ok",
            source_key: doc.key.clone(),
            anonymized: anonymized.len(),
            collection_size,
        })
    }

    /// Appends one stored profile document (a single JSON object) to the master collection.
    pub async fn append_profile_document(&self, doc: &DocumentRef) -> Result<AppendOutcome, PipelineError> {
        let invocation_id = Uuid::new_v4();
        let value = self.read_json(doc).await?;
        if !value.is_object() {
            return Err(PipelineError::InputFormat(format!(
                "'{}' must contain a single JSON object",
                doc.key
            )));
        }

        let collection_size = self
            .merger
            .append(&self.settings.output_bucket, &self.settings.collection_key, &value)
            .await?;
        info!("[{invocation_id}] Appended '{}' to master collection", doc.key);

        Ok(AppendOutcome {
            invocation_id,
            status: "ok",
            source_key: doc.key.clone(),
            collection_size,
        })
    }

    /// Post-claim writes run on their own task, so a dropped caller cannot strand a claim:
    /// the writes either complete or the claim is released.
    async fn persist_claimed(
        &self,
        invocation_id: Uuid,
        source_key: String,
        profile: CandidateProfile,
        resolution: Resolution,
    ) -> Result<Written, PipelineError> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            match pipeline.persist(&source_key, &profile).await {
                Ok(written) => Ok(written),
                Err(e) => {
                    pipeline.release_claim(invocation_id, &resolution).await;
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| PipelineError::Internal(e.into()))?
    }

    async fn persist(&self, source_key: &str, profile: &CandidateProfile) -> Result<Written, PipelineError> {
        let output_key = output_key_for(source_key);
        let body = serde_json::to_vec_pretty(profile).map_err(|e| PipelineError::Internal(e.into()))?;
        self.blobs
            .put(
                &self.settings.output_bucket,
                &output_key,
                Bytes::from(body),
                JSON_CONTENT_TYPE,
                WriteCondition::Unconditional,
            )
            .await?;

        let collection_size = self
            .merger
            .append(&self.settings.output_bucket, &self.settings.collection_key, profile)
            .await?;

        let anonymized_collection_size = if self.settings.anonymize_on_ingest {
            let anonymized = anonymize(profile, &mut rand::thread_rng());
            Some(
                self.merger
                    .append(
                        &self.settings.output_bucket,
                        &self.settings.anonymized_collection_key,
                        &anonymized,
                    )
                    .await?,
            )
        } else {
            None
        };

        Ok(Written {
            output_key,
            collection_size,
            anonymized_collection_size,
        })
    }

    async fn release_claim(&self, invocation_id: Uuid, resolution: &Resolution) {
        if let Err(e) = self.resolver.release(resolution).await {
            error!(
                "[{invocation_id}] Could not release identity claim for {}: {e}",
                resolution.candidate_id
            );
        }
    }

    async fn read_json(&self, doc: &DocumentRef) -> Result<Value, PipelineError> {
        let blob = self.blobs.get(&doc.bucket, &doc.key).await?;
        serde_json::from_slice(&blob.bytes)
            .map_err(|e| PipelineError::InputFormat(format!("'{}' is not valid JSON: {e}", doc.key)))
    }
}

struct Written {
    output_key: String,
    collection_size: usize,
    anonymized_collection_size: Option<usize>,
}

fn skipped(invocation_id: Uuid, source_key: String, candidate_id: String) -> ProcessOutcome {
    ProcessOutcome {
        invocation_id,
        status: ResolutionAction::Skip,
        candidate_id,
        source_key,
        output_key: None,
        collection_size: None,
        anonymized_collection_size: None,
        profile: None,
        skill_report: None,
    }
}

pub fn assemble_profile(
    candidate_id: &str,
    contact: ContactInfo,
    identity_email: &str,
    skills: &ClassifiedSkills,
    experience_summary: String,
    is_post_graduate: u8,
    now: DateTime<Utc>,
) -> CandidateProfile {
    CandidateProfile {
        candidate_id: candidate_id.to_string(),
        name: contact.name,
        email: Some(identity_email.to_string()),
        phone_number: contact.phone,
        skills: SkillLists {
            technical: skills.names(SkillCategory::Technical),
            non_technical: skills.names(SkillCategory::NonTechnical),
        },
        languages_spoken: LanguagesSpoken::from(skills.names(SkillCategory::Language)),
        experience_summary,
        is_post_graduate,
        upload_timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Source key with its extension replaced by `.json`.
pub fn output_key_for(source_key: &str) -> String {
    let (dir, file) = match source_key.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, source_key),
    };
    let stem = match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    };
    match dir {
        Some(dir) => format!("{dir}/{stem}.json"),
        None => format!("{stem}.json"),
    }
}
