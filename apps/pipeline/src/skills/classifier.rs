use std::ops::Range;

use crate::skills::scoring::{score_and_categorize, ClassifiedSkills};
use crate::taxonomy::{SkillCategory, SkillTaxonomy};

/// Finds every taxonomy skill in `text` and scores it.
///
/// Matching is case-insensitive and whole-word. Compound overrides run first and claim
/// their spans; a plain term occurrence inside a claimed span is not counted again.
pub fn classify(text: &str, taxonomy: &SkillTaxonomy) -> ClassifiedSkills {
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut compound_hits = Vec::with_capacity(taxonomy.compounds().len());

    for compound in taxonomy.compounds() {
        let mut count = 0;
        for m in compound.pattern().find_iter(text) {
            let span = m.range();
            if is_whole_word(text, &span) && !overlaps(&claimed, &span) {
                claimed.push(span);
                count += 1;
            }
        }
        compound_hits.push((compound.skill.clone(), compound.category, count));
    }

    let mut hits: Vec<(String, SkillCategory, u32)> = Vec::new();
    for entry in taxonomy.entries() {
        let count = entry
            .matcher()
            .find_iter(text)
            .map(|m| m.range())
            .filter(|span| is_whole_word(text, span) && !overlaps(&claimed, span))
            .count() as u32;
        if count > 0 {
            hits.push((entry.term.clone(), entry.category, count));
        }
    }
    hits.extend(compound_hits);

    score_and_categorize(hits, taxonomy.categories())
}

/// Characters that glue onto a term: `c` inside `c++` or `c#` is not a separate word.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '+' | '#')
}

fn is_whole_word(text: &str, span: &Range<usize>) -> bool {
    let before = text[..span.start].chars().next_back();
    let after = text[span.end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn overlaps(claimed: &[Range<usize>], span: &Range<usize>) -> bool {
    claimed
        .iter()
        .any(|c| c.start < span.end && span.start < c.end)
}
