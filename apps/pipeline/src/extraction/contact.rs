use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

/// Everything that cannot be part of a phone number becomes a space.
static PHONE_NOISE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9+()\-. ]").expect("valid regex"));

/// Delimited grouped digits: `+44 (20) 7946 0958`, `555-123-4567`.
static PHONE_GROUPED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?[0-9]{1,4}[\s\-]?\(?[0-9]{2,5}\)?[\s\-]?[0-9]{3,5}[\s\-]?[0-9]{3,5}")
        .expect("valid regex")
});

/// Bare digit runs.
static PHONE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{10,15}").expect("valid regex"));

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;
const MIN_DISTINCT_DIGITS: usize = 3;

/// First `local@domain` token in the text, lower-cased.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_REGEX
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

/// Best phone number candidate in the text, normalized to digits with an optional leading `+`.
///
/// Candidates must have 10 to 15 digits and at least 3 distinct digits. An international
/// (`+`) candidate wins over the others; otherwise the first one found is returned.
pub fn extract_phone(text: &str) -> Option<String> {
    let cleaned = PHONE_NOISE_REGEX.replace_all(text, " ");

    let mut seen = HashSet::new();
    let candidates: Vec<String> = PHONE_GROUPED_REGEX
        .find_iter(&cleaned)
        .chain(PHONE_RUN_REGEX.find_iter(&cleaned))
        .map(|m| normalize_phone(m.as_str()))
        .filter(|p| is_valid_phone(p))
        .filter(|p| seen.insert(p.clone()))
        .collect();

    candidates
        .iter()
        .find(|p| p.starts_with('+'))
        .or_else(|| candidates.first())
        .cloned()
}

/// Keeps digits, plus a `+` only when it leads the number.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let mut out = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        out.push('+');
    }
    out.extend(trimmed.chars().filter(char::is_ascii_digit));
    out
}

fn is_valid_phone(phone: &str) -> bool {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let distinct: HashSet<&char> = digits.iter().collect();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
        && distinct.len() >= MIN_DISTINCT_DIGITS
}
