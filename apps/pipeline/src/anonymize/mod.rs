//! One-way anonymization of candidate profiles.
//!
//! The candidate ID, name, email and phone are replaced; every other field is copied.
//! No mapping back to the original is kept anywhere.

pub mod names;

use rand::Rng;

use crate::identity::ids::{mint_anonymous_id, ANONYMOUS_ID_PREFIX};
use crate::models::{AnonymizedProfile, CandidateProfile};

/// Digits kept visible at the end of a masked phone number.
pub const VISIBLE_PHONE_DIGITS: usize = 4;
pub const MASK_CHAR: char = 'X';
/// Replacement for phone values too short to keep a suffix.
pub const SHORT_PHONE_MASK: &str = "XXXX";

/// Random draws before falling back to a scan of the whole name space.
const MAX_NAME_DRAWS: usize = 16;
/// Shortest fragment of the original identity that may not reappear in the synthetic email.
const LEAK_WINDOW: usize = 3;

pub fn anonymize<R: Rng + ?Sized>(profile: &CandidateProfile, rng: &mut R) -> AnonymizedProfile {
    let original_local = profile
        .email
        .as_deref()
        .and_then(|email| email.split('@').next())
        .unwrap_or_default()
        .to_lowercase();
    let original_name = profile.name.as_deref().unwrap_or_default().to_lowercase();
    let sources = [original_local.as_str(), original_name.as_str()];

    let name = pick_name(rng, &sources);
    let email = names::synthetic_email(&name);

    AnonymizedProfile::new(CandidateProfile {
        candidate_id: mint_anonymous_id(rng),
        name: Some(name),
        email: Some(email),
        phone_number: mask_phone(profile.phone_number.as_deref()),
        ..profile.clone()
    })
}

/// Keeps the last four digits and masks the rest. Values with four digits or fewer
/// (including an empty string) become `XXXX`; an absent phone stays absent.
pub fn mask_phone(phone: Option<&str>) -> Option<String> {
    let phone = phone?;
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= VISIBLE_PHONE_DIGITS {
        return Some(SHORT_PHONE_MASK.to_string());
    }
    let split = digits.len() - VISIBLE_PHONE_DIGITS;
    let mut masked: String = std::iter::repeat(MASK_CHAR).take(split).collect();
    masked.extend(&digits[split..]);
    Some(masked)
}

fn pick_name<R: Rng + ?Sized>(rng: &mut R, sources: &[&str]) -> String {
    let is_clean = |name: &str| !leaks(&names::email_local_part(name), sources);

    let drawn = (0..MAX_NAME_DRAWS)
        .map(|_| names::synthetic_name(rng))
        .find(|name| is_clean(name));
    drawn
        .or_else(|| names::all_names().find(|name| is_clean(name)))
        .or_else(|| Some(names::FALLBACK_NAME.to_string()).filter(|name| is_clean(name)))
        .unwrap_or_else(|| opaque_name(rng, sources))
}

/// A single hex token, redrawn until clean. Tokens shorter than `LEAK_WINDOW` cannot
/// contain a fragment, so the last draw is cut to that length.
fn opaque_name<R: Rng + ?Sized>(rng: &mut R, sources: &[&str]) -> String {
    let mut last = String::new();
    for _ in 0..MAX_NAME_DRAWS {
        let id = mint_anonymous_id(rng);
        let token = id.strip_prefix(ANONYMOUS_ID_PREFIX).unwrap_or(&id).to_string();
        if !leaks(&names::email_local_part(&token), sources) {
            return token;
        }
        last = token;
    }
    last.chars().take(LEAK_WINDOW - 1).collect()
}

/// True when `candidate` shares any `LEAK_WINDOW`-character fragment with a source.
fn leaks(candidate: &str, sources: &[&str]) -> bool {
    let chars: Vec<char> = candidate.chars().collect();
    chars.windows(LEAK_WINDOW).any(|window| {
        let fragment: String = window.iter().collect();
        sources.iter().any(|source| source.contains(&fragment))
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::models::{LanguagesSpoken, SkillLists};

    fn profile(name: &str, email: &str, phone: Option<&str>) -> CandidateProfile {
        CandidateProfile {
            candidate_id: "R2026-1234-5678-9ABC".to_string(),
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone_number: phone.map(String::from),
            skills: SkillLists {
                technical: vec!["python".to_string(), "docker".to_string()],
                non_technical: vec!["leadership".to_string()],
            },
            languages_spoken: LanguagesSpoken::Listed(vec!["english".to_string()]),
            experience_summary: "Backend Engineer".to_string(),
            is_post_graduate: 1,
            upload_timestamp: "2026-05-01T10:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone(Some("5551234567")).as_deref(), Some("XXXXXX4567"));
        assert_eq!(mask_phone(Some("+1 (555) 123-4567")).as_deref(), Some("XXXXXXX4567"));
        assert_eq!(mask_phone(Some("123")).as_deref(), Some("XXXX"));
        assert_eq!(mask_phone(Some("1234")).as_deref(), Some("XXXX"));
        assert_eq!(mask_phone(Some("")).as_deref(), Some("XXXX"));
        assert_eq!(mask_phone(None), None);
    }

    #[test]
    fn test_pii_replaced_and_rest_copied() {
        let original = profile("John Doe", "john.doe@acme.com", Some("555-123-4567"));
        let mut rng = StdRng::seed_from_u64(11);
        let anon = anonymize(&original, &mut rng);
        let p = anon.profile();

        assert!(p.candidate_id.starts_with("CAND_"));
        assert_ne!(p.candidate_id, original.candidate_id);
        assert_ne!(p.name, original.name);
        assert_ne!(p.email, original.email);
        assert_eq!(p.phone_number.as_deref(), Some("XXXXXX4567"));

        assert_eq!(p.skills, original.skills);
        assert_eq!(p.languages_spoken, original.languages_spoken);
        assert_eq!(p.experience_summary, original.experience_summary);
        assert_eq!(p.is_post_graduate, original.is_post_graduate);
        assert_eq!(p.upload_timestamp, original.upload_timestamp);
    }

    #[test]
    fn test_email_derived_from_synthetic_name() {
        let original = profile("John Doe", "john.doe@acme.com", None);
        let anon = anonymize(&original, &mut StdRng::seed_from_u64(5));
        let p = anon.profile();
        let name = p.name.as_deref().unwrap();
        assert_eq!(p.email.as_deref(), Some(names::synthetic_email(name).as_str()));
        assert_eq!(p.phone_number, None);
    }

    #[test]
    fn test_email_local_part_never_echoes_original() {
        let mut rng = StdRng::seed_from_u64(99);
        let originals: Vec<(String, String)> = names::all_names()
            .step_by(7)
            .map(|name| {
                let email = format!("{}@corp.example", names::email_local_part(&name));
                (name, email)
            })
            .chain([
                ("Ana Li".to_string(), "ana.li@x.io".to_string()),
                ("Mario Rossi".to_string(), "mario_rossi1987@mail.it".to_string()),
            ])
            .collect();

        for (name, email) in originals {
            let anon = anonymize(&profile(&name, &email, None), &mut rng);
            let synthetic = anon.profile().email.clone().unwrap();
            let synthetic_local = synthetic.split('@').next().unwrap();
            let original_local = email.split('@').next().unwrap();
            assert!(
                !leaks(synthetic_local, &[original_local]),
                "{synthetic_local} echoes {original_local}"
            );
        }
    }

    #[test]
    fn test_local_part_blocking_every_name_still_gets_clean_email() {
        let every_local = names::all_names()
            .map(|name| names::email_local_part(&name))
            .collect::<Vec<_>>()
            .join("_");
        let original = profile(
            names::FALLBACK_NAME,
            &format!("{every_local}@corp.example"),
            None,
        );
        let sources = [every_local.as_str(), "anonymous candidate"];

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..3 {
            let anon = anonymize(&original, &mut rng);
            let p = anon.profile();
            let name = p.name.as_deref().unwrap();
            let email = p.email.clone().unwrap();
            let local = email.split('@').next().unwrap();

            assert_ne!(name, names::FALLBACK_NAME);
            assert!(!leaks(local, &sources), "{local} echoes the original");
            assert_eq!(email, names::synthetic_email(name));
        }
    }

    #[test]
    fn test_short_tokens_never_leak() {
        assert!(!leaks("ab", &["abcdef"]));
        assert!(leaks("xabc", &["abcdef"]));
    }

    #[test]
    fn test_ids_are_fresh_per_call() {
        let original = profile("John Doe", "john.doe@acme.com", None);
        let mut rng = StdRng::seed_from_u64(1);
        let a = anonymize(&original, &mut rng);
        let b = anonymize(&original, &mut rng);
        assert_ne!(a.profile().candidate_id, b.profile().candidate_id);
    }
}
