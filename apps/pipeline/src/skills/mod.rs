// Skill classification: taxonomy matching, per-category aggregation and relevance scoring.

pub mod classifier;
pub mod scoring;

pub use classifier::classify;
pub use scoring::{relevance_score, score_and_categorize, ClassifiedSkills, SkillMatch, SkillSummary};
