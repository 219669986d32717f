use rand::seq::SliceRandom;
use rand::Rng;
use sha2::{Digest, Sha256};

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Abigail", "Adrian", "Aisha", "Alejandro", "Amara", "Bianca", "Boris", "Camila",
    "Chidi", "Clara", "Dmitri", "Elena", "Emeka", "Farah", "Felix", "Gabriel", "Greta", "Hana",
    "Hugo", "Ingrid", "Isaac", "Jasper", "Keiko", "Lars", "Leila", "Lucia", "Mateo", "Mira",
    "Nadia", "Nikhil", "Olga", "Oscar", "Priya", "Quentin", "Rafael", "Rosa", "Sakura",
    "Tomas", "Uma", "Vera", "Wendell", "Ximena", "Yusuf", "Zara",
];

const LAST_NAMES: &[&str] = &[
    "Abara", "Becker", "Castillo", "Dubois", "Eriksen", "Fischer", "Gupta", "Haddad", "Ivanova",
    "Jansen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov", "Quiroga",
    "Rossi", "Santos", "Tanaka", "Ueda", "Varga", "Weber", "Xu", "Yilmaz", "Zielinski",
    "Bianchi", "Costa", "Delgado", "Horvath", "Kaur", "Mendez", "Novak", "Ortega", "Silva",
];

const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "protonmail.com",
    "mail.com",
];

/// Used only when every draw would echo part of the original identity.
pub const FALLBACK_NAME: &str = "Anonymous Candidate";

/// A random `First Last` name.
pub fn synthetic_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Morgan");
    format!("{first} {last}")
}

/// Every name the generator can produce, in a fixed order.
pub fn all_names() -> impl Iterator<Item = String> {
    FIRST_NAMES
        .iter()
        .flat_map(|first| LAST_NAMES.iter().map(move |last| format!("{first} {last}")))
}

/// `first.last` from the name's lower-cased tokens.
pub fn email_local_part(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".")
}

/// `first.last@domain`, where the domain is a pure function of the name.
pub fn synthetic_email(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let domain = EMAIL_DOMAINS[usize::from(digest[0]) % EMAIL_DOMAINS.len()];
    format!("{}@{domain}", email_local_part(name))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_synthetic_email_is_stable_for_a_name() {
        assert_eq!(synthetic_email("Mira Costa"), synthetic_email("Mira Costa"));
        assert!(synthetic_email("Mira Costa").starts_with("mira.costa@"));
    }

    #[test]
    fn test_synthetic_name_has_two_tokens() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(synthetic_name(&mut rng).split_whitespace().count(), 2);
        }
    }

    #[test]
    fn test_all_names_covers_every_pair() {
        assert_eq!(all_names().count(), FIRST_NAMES.len() * LAST_NAMES.len());
    }
}
