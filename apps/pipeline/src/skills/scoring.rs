use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::taxonomy::SkillCategory;

/// Relevance of a skill mentioned `frequency` times: 10 points per mention, capped at 100.
pub fn relevance_score(frequency: u32) -> u32 {
    frequency.saturating_mul(10).min(100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    pub skill: String,
    pub category: SkillCategory,
    /// Always >= 1.
    pub frequency: u32,
    pub relevance_score: u32,
}

impl SkillMatch {
    pub fn new(skill: impl Into<String>, category: SkillCategory, frequency: u32) -> Self {
        Self {
            skill: skill.into(),
            category,
            frequency,
            relevance_score: relevance_score(frequency),
        }
    }
}

/// Scored skills per category.
///
/// Each list is ordered by descending frequency; equal frequencies keep first-seen order.
/// Every category the taxonomy defines is present, possibly with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassifiedSkills {
    by_category: BTreeMap<SkillCategory, Vec<SkillMatch>>,
}

impl ClassifiedSkills {
    pub fn get(&self, category: SkillCategory) -> &[SkillMatch] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn contains_category(&self, category: SkillCategory) -> bool {
        self.by_category.contains_key(&category)
    }

    /// Skill names of one category, in contract order.
    pub fn names(&self, category: SkillCategory) -> Vec<String> {
        self.get(category).iter().map(|m| m.skill.clone()).collect()
    }

    pub fn summary(&self) -> SkillSummary {
        let mut top_skills = BTreeMap::new();
        for (category, matches) in &self.by_category {
            if let Some(top) = matches.first() {
                top_skills.insert(*category, top.skill.clone());
            }
        }
        SkillSummary {
            total_unique_skills: self.by_category.values().map(Vec::len).sum(),
            total_skill_mentions: self
                .by_category
                .values()
                .flatten()
                .map(|m| m.frequency)
                .sum(),
            categories_found: self.by_category.values().filter(|v| !v.is_empty()).count(),
            top_skills,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub total_unique_skills: usize,
    pub total_skill_mentions: u32,
    pub categories_found: usize,
    pub top_skills: BTreeMap<SkillCategory, String>,
}

/// Merges raw `(skill, category, count)` hits and scores them.
///
/// Hits for the same `(skill, category)` pair are summed, so a skill reached through
/// several pattern paths is reported once. Zero counts are dropped.
pub fn score_and_categorize<I>(hits: I, categories: &[SkillCategory]) -> ClassifiedSkills
where
    I: IntoIterator<Item = (String, SkillCategory, u32)>,
{
    let mut merged: Vec<(String, SkillCategory, u32)> = Vec::new();
    let mut index: HashMap<(String, SkillCategory), usize> = HashMap::new();

    for (skill, category, count) in hits {
        if count == 0 {
            continue;
        }
        match index.get(&(skill.clone(), category)) {
            Some(&i) => merged[i].2 += count,
            None => {
                index.insert((skill.clone(), category), merged.len());
                merged.push((skill, category, count));
            }
        }
    }

    let mut by_category: BTreeMap<SkillCategory, Vec<SkillMatch>> = categories
        .iter()
        .map(|category| (*category, Vec::new()))
        .collect();

    for (skill, category, frequency) in merged {
        by_category
            .entry(category)
            .or_default()
            .push(SkillMatch::new(skill, category, frequency));
    }

    for matches in by_category.values_mut() {
        // stable: ties keep insertion order
        matches.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    }

    ClassifiedSkills { by_category }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(skill: &str, category: SkillCategory, count: u32) -> (String, SkillCategory, u32) {
        (skill.to_string(), category, count)
    }

    #[test]
    fn test_relevance_score_caps_at_100() {
        assert_eq!(relevance_score(12), 100);
        assert_eq!(relevance_score(10), 100);
        assert_eq!(relevance_score(3), 30);
        assert_eq!(relevance_score(1), 10);
        assert_eq!(relevance_score(u32::MAX), 100);
    }

    #[test]
    fn test_counts_merge_per_skill_and_category() {
        let result = score_and_categorize(
            vec![
                hit("node.js", SkillCategory::Technical, 2),
                hit("node.js", SkillCategory::Technical, 3),
            ],
            &[SkillCategory::Technical],
        );
        let technical = result.get(SkillCategory::Technical);
        assert_eq!(technical.len(), 1);
        assert_eq!(technical[0].frequency, 5);
        assert_eq!(technical[0].relevance_score, 50);
    }

    #[test]
    fn test_sorted_by_frequency_with_stable_ties() {
        let result = score_and_categorize(
            vec![
                hit("sql", SkillCategory::Technical, 1),
                hit("python", SkillCategory::Technical, 4),
                hit("docker", SkillCategory::Technical, 1),
                hit("rust", SkillCategory::Technical, 4),
            ],
            &[SkillCategory::Technical],
        );
        assert_eq!(
            result.names(SkillCategory::Technical),
            vec!["python", "rust", "sql", "docker"]
        );
    }

    #[test]
    fn test_defined_category_without_hits_is_empty_list() {
        let result = score_and_categorize(
            vec![hit("python", SkillCategory::Technical, 1)],
            &SkillCategory::ALL,
        );
        assert!(result.contains_category(SkillCategory::Language));
        assert!(result.get(SkillCategory::Language).is_empty());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["nonTechnical"], serde_json::json!([]));
        assert_eq!(json["technical"][0]["relevanceScore"], 10);
    }

    #[test]
    fn test_summary_totals_and_top_skills() {
        let result = score_and_categorize(
            vec![
                hit("python", SkillCategory::Technical, 3),
                hit("docker", SkillCategory::Technical, 1),
                hit("leadership", SkillCategory::NonTechnical, 2),
            ],
            &SkillCategory::ALL,
        );
        let summary = result.summary();
        assert_eq!(summary.total_unique_skills, 3);
        assert_eq!(summary.total_skill_mentions, 6);
        assert_eq!(summary.categories_found, 2);
        assert_eq!(summary.top_skills[&SkillCategory::Technical], "python");
        assert!(!summary.top_skills.contains_key(&SkillCategory::Language));
    }
}
