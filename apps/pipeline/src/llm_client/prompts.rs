// Shared prompt fragments for oracle calls.
// Field-specific prompts live next to the extractor in extraction/prompts.rs.

/// System prompt for every extraction call: bare answers only.
pub const EXTRACTION_SYSTEM: &str = "You are a precise résumé field extractor. \
    Answer with the requested value only. \
    Do NOT add labels, quotes, explanations, apologies or markdown.";
