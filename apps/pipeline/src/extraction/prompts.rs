// Entity extraction prompt templates.
// `{resume_text}` is replaced with the full résumé text before the call.

pub const NAME_PROMPT: &str = r#"From the résumé text below, extract only the full name of the candidate.
Do NOT add titles, labels, explanations or punctuation. Return the name and nothing else.

RÉSUMÉ TEXT:
---
{resume_text}
---
Name:"#;

pub const SUMMARY_PROMPT: &str = r#"Act as an expert technical recruiter. Read the résumé text below and write a one-line professional summary.

RULES:
- Name the candidate's main field or technical domain (e.g. "Full-Stack Developer", "Data Scientist", "Cloud Engineer").
- If a total duration of experience is stated explicitly (e.g. "5 years"), include it.
- Keep it short and do NOT wrap it in quotes.
- Example: "Full-Stack Developer with 5 years of experience in React and Node.js."
- Example: "Data Scientist specializing in machine learning and NLP."
- If the field cannot be determined with confidence, or no experience is mentioned, answer with the single word NONE.

RÉSUMÉ TEXT:
---
{resume_text}
---"#;

pub const POSTGRAD_PROMPT: &str = r#"Decide whether the candidate in the résumé text below holds or is pursuing a postgraduate degree.
Look for Master's, M.S., M.Sc., M.Tech, MBA, PhD, Post Graduate, PGDM or similar advanced degrees.

- If any postgraduate degree is mentioned (completed or ongoing), your entire answer must be the single digit: 1
- Otherwise your entire answer must be the single digit: 0

RÉSUMÉ TEXT:
---
{resume_text}
---
Result:"#;
