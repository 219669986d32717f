//! Entity extraction: regex for contact fields, the completion oracle for fields free-form
//! résumés do not label consistently (name, summary, post-graduate flag).
//!
//! Oracle failures never escape this module. Every oracle-backed field degrades to its
//! sentinel and the failure is logged.

pub mod contact;
pub mod prompts;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::llm_client::{CompletionOracle, OracleError};
use crate::models::{ContactInfo, NOT_DEFINED};

pub use contact::{extract_email, extract_phone};

/// Substituted when the oracle cannot produce a plausible name.
pub const NAME_SENTINEL: &str = "Could not extract name.";
/// Longer answers are treated as a failed extraction.
pub const MAX_NAME_WORDS: usize = 5;

const NAME_MAX_TOKENS: u32 = 20;
const SUMMARY_MAX_TOKENS: u32 = 150;
const POSTGRAD_MAX_TOKENS: u32 = 5;

/// Oracle answers containing any of these are refusals, not summaries.
const SUMMARY_REJECT_MARKERS: [&str; 4] = ["none", "sorry", "unable", "error"];

#[derive(Clone)]
pub struct Extractor {
    oracle: Arc<dyn CompletionOracle>,
    timeout: Duration,
}

impl Extractor {
    pub fn new(oracle: Arc<dyn CompletionOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Contact fields of one document. Email and phone come from regex, the name from the oracle.
    pub async fn extract(&self, text: &str) -> ContactInfo {
        ContactInfo {
            name: Some(self.name(text).await),
            email: extract_email(text),
            phone: extract_phone(text),
        }
    }

    pub async fn name(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return NAME_SENTINEL.to_string();
        }
        self.ask("name", prompts::NAME_PROMPT, text, NAME_MAX_TOKENS)
            .await
            .and_then(|answer| clean_name(&answer))
            .unwrap_or_else(|| NAME_SENTINEL.to_string())
    }

    /// One-line recruiter summary, or `"Not defined"`.
    pub async fn experience_summary(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return NOT_DEFINED.to_string();
        }
        self.ask("summary", prompts::SUMMARY_PROMPT, text, SUMMARY_MAX_TOKENS)
            .await
            .and_then(|answer| clean_summary(&answer))
            .unwrap_or_else(|| NOT_DEFINED.to_string())
    }

    /// 1 only when the oracle answers exactly `1`.
    pub async fn is_post_graduate(&self, text: &str) -> u8 {
        if text.trim().is_empty() {
            return 0;
        }
        self.ask("post_graduate", prompts::POSTGRAD_PROMPT, text, POSTGRAD_MAX_TOKENS)
            .await
            .map(|answer| parse_binary_flag(&answer))
            .unwrap_or(0)
    }

    async fn ask(
        &self,
        field: &'static str,
        template: &str,
        text: &str,
        max_tokens: u32,
    ) -> Option<String> {
        let prompt = template.replace("{resume_text}", text);
        let result = match tokio::time::timeout(self.timeout, self.oracle.complete(&prompt, max_tokens))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.timeout)),
        };

        match result {
            Ok(answer) => {
                debug!("Oracle answered field '{field}' ({} chars)", answer.len());
                Some(answer)
            }
            Err(e) => {
                warn!("Oracle failed for field '{field}', using sentinel: {e}");
                None
            }
        }
    }
}

/// Trims whitespace and surrounding quotes; rejects empty or sentence-length answers.
pub fn clean_name(answer: &str) -> Option<String> {
    let name = answer
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    let words = name.split_whitespace().count();
    if words == 0 || words > MAX_NAME_WORDS {
        return None;
    }
    Some(name.to_string())
}

pub fn clean_summary(answer: &str) -> Option<String> {
    let summary = answer.trim();
    let lower = summary.to_lowercase();
    if summary.is_empty() || SUMMARY_REJECT_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }
    Some(summary.to_string())
}

/// Fail-closed: anything but exactly `1` is 0.
pub fn parse_binary_flag(answer: &str) -> u8 {
    u8::from(answer.trim() == "1")
}
