pub mod identity;
pub mod profile;

pub use identity::IdentityRecord;
pub use profile::{
    AnonymizedProfile, CandidateProfile, ContactInfo, LanguagesSpoken, SkillLists, NOT_DEFINED,
};
