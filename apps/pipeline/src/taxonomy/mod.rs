//! Skill taxonomy: the immutable dictionary the classifier matches against.
//!
//! Built once at startup (built-in tables or an operator-supplied JSON file) and
//! shared read-only behind an `Arc`. Every term carries its compiled matcher.

mod data;

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillCategory {
    Technical,
    NonTechnical,
    Language,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 3] = [
        SkillCategory::Technical,
        SkillCategory::NonTechnical,
        SkillCategory::Language,
    ];
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("invalid pattern for '{term}': {source}")]
    InvalidPattern {
        term: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read taxonomy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse taxonomy file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A plain dictionary term.
#[derive(Debug, Clone)]
pub struct TaxonomyEntry {
    pub term: String,
    pub category: SkillCategory,
    matcher: Regex,
}

impl TaxonomyEntry {
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }
}

/// A multi-spelling pattern that reports under one canonical skill.
#[derive(Debug, Clone)]
pub struct CompoundOverride {
    pub skill: String,
    pub category: SkillCategory,
    pattern: Regex,
}

impl CompoundOverride {
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// On-disk / serialized form of a taxonomy. A category is "defined" when its list is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomySource {
    #[serde(default)]
    pub technical: Option<Vec<String>>,
    #[serde(default)]
    pub non_technical: Option<Vec<String>>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub compounds: Vec<CompoundSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundSource {
    pub pattern: String,
    pub skill: String,
    pub category: SkillCategory,
}

#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    entries: Vec<TaxonomyEntry>,
    compounds: Vec<CompoundOverride>,
    categories: Vec<SkillCategory>,
}

impl SkillTaxonomy {
    /// Compiles a taxonomy. Terms are trimmed and lower-cased; a term seen twice keeps its
    /// first category.
    pub fn from_source(source: TaxonomySource) -> Result<Self, TaxonomyError> {
        let mut entries = Vec::new();
        let mut categories = Vec::new();
        let mut seen = HashSet::new();

        let lists = [
            (SkillCategory::Technical, source.technical),
            (SkillCategory::NonTechnical, source.non_technical),
            (SkillCategory::Language, source.languages),
        ];

        for (category, terms) in lists {
            let Some(terms) = terms else { continue };
            categories.push(category);
            for raw in terms {
                let term = raw.trim().to_lowercase();
                if term.is_empty() {
                    continue;
                }
                if !seen.insert(term.clone()) {
                    debug!("Skipping duplicate taxonomy term '{term}' under {category:?}");
                    continue;
                }
                let matcher = compile(&term, &regex::escape(&term))?;
                entries.push(TaxonomyEntry {
                    term,
                    category,
                    matcher,
                });
            }
        }

        let mut compounds = Vec::with_capacity(source.compounds.len());
        for compound in source.compounds {
            let pattern = compile(&compound.skill, &compound.pattern)?;
            if !categories.contains(&compound.category) {
                categories.push(compound.category);
            }
            compounds.push(CompoundOverride {
                skill: compound.skill.trim().to_lowercase(),
                category: compound.category,
                pattern,
            });
        }

        categories.sort();
        Ok(Self {
            entries,
            compounds,
            categories,
        })
    }

    pub fn builtin() -> Result<Self, TaxonomyError> {
        let to_owned = |terms: &[&str]| terms.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        Self::from_source(TaxonomySource {
            technical: Some(to_owned(data::TECHNICAL)),
            non_technical: Some(to_owned(data::NON_TECHNICAL)),
            languages: Some(to_owned(data::LANGUAGES)),
            compounds: data::COMPOUNDS
                .iter()
                .map(|(pattern, skill, category)| CompoundSource {
                    pattern: pattern.to_string(),
                    skill: skill.to_string(),
                    category: *category,
                })
                .collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path)?;
        let source: TaxonomySource = serde_json::from_str(&raw)?;
        Self::from_source(source)
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn compounds(&self) -> &[CompoundOverride] {
        &self.compounds
    }

    /// Categories the taxonomy defines, in canonical order.
    pub fn categories(&self) -> &[SkillCategory] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.compounds.is_empty()
    }
}

fn compile(term: &str, pattern: &str) -> Result<Regex, TaxonomyError> {
    Regex::new(&format!("(?i)(?:{pattern})")).map_err(|source| TaxonomyError::InvalidPattern {
        term: term.to_string(),
        source,
    })
}
