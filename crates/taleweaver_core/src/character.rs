//! Story characters and request descriptors.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use taleweaver_error::{TaleweaverResult, ValidationError};

/// Voice gender of a character.
///
/// Unknown labels fall back to [`Gender::NonBinary`].
///
/// # Examples
///
/// ```
/// use taleweaver_core::Gender;
///
/// assert_eq!(Gender::from_label("Female"), Gender::Female);
/// assert_eq!(Gender::from_label("robot"), Gender::NonBinary);
/// assert_eq!(Gender::Male.to_string(), "male");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Gender {
    /// Male voice
    Male,
    /// Female voice
    Female,
    /// Neutral or otherworldly voice
    #[default]
    NonBinary,
}

impl Gender {
    /// Parse a free-form label, defaulting to non-binary.
    pub fn from_label(label: &str) -> Self {
        Self::from_str(label.trim()).unwrap_or_default()
    }

    /// Whether the label names one of the known genders.
    pub fn is_known(label: &str) -> bool {
        Self::from_str(label.trim()).is_ok()
    }
}

/// A named participant in the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Display name, also the voice cache key (lower-cased)
    pub name: String,
    /// Voice gender
    #[serde(default)]
    pub gender: Gender,
    /// Personality traits used for role inference
    #[serde(default)]
    pub traits: Vec<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit role hint (hero, villain, mentor, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Character {
    /// Create a character with no traits.
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
            traits: Vec::new(),
            description: None,
            role: None,
        }
    }

    /// Parse a `"Name|gender|traits"` descriptor.
    ///
    /// With two parts the second is a gender when recognised, otherwise the
    /// trait list.
    ///
    /// # Examples
    ///
    /// ```
    /// use taleweaver_core::{Character, Gender};
    ///
    /// let alex = Character::from_descriptor("Alex|male|brave, curious").unwrap();
    /// assert_eq!(alex.gender, Gender::Male);
    /// assert_eq!(alex.traits, vec!["brave", "curious"]);
    ///
    /// let sam = Character::from_descriptor("Sam|loyal").unwrap();
    /// assert_eq!(sam.gender, Gender::NonBinary);
    /// assert_eq!(sam.traits, vec!["loyal"]);
    /// ```
    pub fn from_descriptor(descriptor: &str) -> TaleweaverResult<Self> {
        let parts: Vec<&str> = descriptor.split('|').map(str::trim).collect();
        let name = parts.first().copied().unwrap_or_default();
        if name.is_empty() {
            return Err(ValidationError::new(format!(
                "Character descriptor '{}' is missing a name",
                descriptor
            ))
            .into());
        }

        let second = parts.get(1).copied().unwrap_or_default();
        let gender = Gender::from_label(second);
        let traits = match parts.get(2).copied().filter(|t| !t.is_empty()) {
            Some(traits) => parse_traits(traits),
            None if Gender::is_known(second) => Vec::new(),
            None => parse_traits(second),
        };

        Ok(Self {
            name: name.to_string(),
            gender,
            traits,
            description: None,
            role: None,
        })
    }

    /// Lower-cased name used as the voice cache key.
    pub fn cache_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Split a comma separated trait list, dropping blanks.
pub fn parse_traits(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
