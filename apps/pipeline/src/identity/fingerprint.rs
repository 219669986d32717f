use sha2::{Digest, Sha256};

/// Canonical form of a document for fingerprinting: LF line endings, no trailing
/// whitespace on any line, no leading or trailing blank space overall.
pub fn normalize_document(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Hex SHA-256 of the normalized document.
pub fn content_fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(normalize_document(text).as_bytes()))
}
