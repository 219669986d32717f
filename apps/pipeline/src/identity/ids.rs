//! Identifier minting. All random identifiers in the pipeline come from here.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

/// Random bits in a candidate ID suffix.
pub const CANDIDATE_ID_RANDOM_BITS: u32 = 48;
/// Random bits in an anonymous ID.
pub const ANONYMOUS_ID_RANDOM_BITS: u32 = 48;

pub const ANONYMOUS_ID_PREFIX: &str = "CAND_";

/// `R<year>-XXXX-XXXX-XXXX`, upper-case hex in groups of four.
pub fn mint_candidate_id<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> String {
    let hex = random_hex(rng, CANDIDATE_ID_RANDOM_BITS);
    let groups: Vec<&str> = hex
        .as_bytes()
        .chunks(4)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();
    format!("R{}-{}", now.year(), groups.join("-"))
}

/// `CAND_` followed by twelve upper-case hex digits.
pub fn mint_anonymous_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{ANONYMOUS_ID_PREFIX}{}",
        random_hex(rng, ANONYMOUS_ID_RANDOM_BITS)
    )
}

fn random_hex<R: Rng + ?Sized>(rng: &mut R, bits: u32) -> String {
    let value = rng.gen::<u64>() & ((1u64 << bits) - 1);
    format!("{:0width$X}", value, width = (bits / 4) as usize)
}
