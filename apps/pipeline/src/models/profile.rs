use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel used wherever a free-text field could not be determined.
pub const NOT_DEFINED: &str = "Not defined";

/// Contact fields recovered from one résumé. Produced once per document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLists {
    pub technical: Vec<String>,
    pub non_technical: Vec<String>,
}

/// Spoken languages found in the résumé, or the `"Not defined"` sentinel on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguagesSpoken {
    Listed(Vec<String>),
    NotDefined,
}

impl From<Vec<String>> for LanguagesSpoken {
    fn from(languages: Vec<String>) -> Self {
        if languages.is_empty() {
            LanguagesSpoken::NotDefined
        } else {
            LanguagesSpoken::Listed(languages)
        }
    }
}

impl Serialize for LanguagesSpoken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LanguagesSpoken::Listed(languages) => languages.serialize(serializer),
            LanguagesSpoken::NotDefined => serializer.serialize_str(NOT_DEFINED),
        }
    }
}

impl<'de> Deserialize<'de> for LanguagesSpoken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Listed(Vec<String>),
            Sentinel(String),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Listed(languages) => LanguagesSpoken::from(languages),
            Wire::Sentinel(_) => LanguagesSpoken::NotDefined,
        })
    }
}

/// The unit of pipeline output, persisted per document and appended to the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub candidate_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub skills: SkillLists,
    pub languages_spoken: LanguagesSpoken,
    pub experience_summary: String,
    /// 0 or 1.
    pub is_post_graduate: u8,
    pub upload_timestamp: String,
}

/// A profile whose PII fields have been replaced by synthetic values.
/// Serializes exactly like a `CandidateProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnonymizedProfile(CandidateProfile);

impl AnonymizedProfile {
    pub(crate) fn new(profile: CandidateProfile) -> Self {
        Self(profile)
    }

    #[cfg(test)]
    pub fn profile(&self) -> &CandidateProfile {
        &self.0
    }
}
