//! Immutable voice alias tables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use taleweaver_error::{ConfigError, TaleweaverResult};

const BUILTIN_CATALOG: &str = include_str!("../voices.toml");

/// A voice with display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVoice {
    /// Provider voice id
    pub id: String,
    /// Display name
    pub name: String,
    /// Gender label
    pub gender: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Delivery style
    #[serde(default)]
    pub style: String,
    /// Accent
    #[serde(default)]
    pub accent: String,
    /// Offered as a narrator choice
    #[serde(default, skip_serializing)]
    pub narrator: bool,
}

/// Role voices for one gender. Unset roles fall back to `hero`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct GenderVoices {
    young_hero: Option<String>,
    hero: Option<String>,
    villain: Option<String>,
    mentor: Option<String>,
    sidekick: Option<String>,
    mystical: Option<String>,
    neutral: Option<String>,
}

/// Role × gender voice table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct CharacterVoiceTable {
    #[serde(default)]
    male: GenderVoices,
    #[serde(default)]
    female: GenderVoices,
    #[serde(default)]
    non_binary: GenderVoices,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AliasTables {
    #[serde(default)]
    narrator: HashMap<String, String>,
    #[serde(default)]
    character: HashMap<String, String>,
}

/// The alias and selection tables used by [`crate::VoiceResolver`].
///
/// # Examples
///
/// ```
/// use taleweaver_voice::VoiceCatalog;
///
/// let catalog = VoiceCatalog::builtin().unwrap();
/// assert_eq!(catalog.default_narrator(), "EkK5I93UQWFDigLMpZcX");
/// assert_eq!(catalog.narrators().len(), 10);
/// ```
#[derive(Debug, Clone, Deserialize, derive_getters::Getters)]
pub struct VoiceCatalog {
    /// Fallback narrator voice
    default_narrator: String,
    /// Fallback character voice
    default_character: String,
    /// Narration tone → voice id
    #[serde(default)]
    tones: HashMap<String, String>,
    /// Role × gender voices
    #[serde(default)]
    characters: CharacterVoiceTable,
    #[serde(default)]
    #[getter(skip)]
    aliases: AliasTables,
    /// Voices with display names
    #[serde(default)]
    voices: Vec<CatalogVoice>,
}

impl VoiceCatalog {
    /// The catalog bundled with the crate.
    pub fn builtin() -> TaleweaverResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(raw: &str) -> TaleweaverResult<Self> {
        let mut catalog: VoiceCatalog = toml::from_str(raw)
            .map_err(|e| ConfigError::new(format!("Invalid voice catalog: {}", e)))?;
        catalog.aliases.narrator = normalize_keys(catalog.aliases.narrator);
        catalog.aliases.character = normalize_keys(catalog.aliases.character);
        catalog.tones = normalize_keys(catalog.tones);
        Ok(catalog)
    }

    /// Load a catalog from a TOML file.
    #[tracing::instrument(fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path> + std::fmt::Debug) -> TaleweaverResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read voice catalog {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let catalog = Self::from_toml_str(&raw)?;
        tracing::info!(voices = catalog.voices.len(), "Loaded voice catalog");
        Ok(catalog)
    }

    /// Narrator alias table.
    pub fn narrator_aliases(&self) -> &HashMap<String, String> {
        &self.aliases.narrator
    }

    /// Character alias table.
    pub fn character_aliases(&self) -> &HashMap<String, String> {
        &self.aliases.character
    }

    /// Voices offered as narrator choices.
    pub fn narrators(&self) -> Vec<CatalogVoice> {
        self.voices.iter().filter(|v| v.narrator).cloned().collect()
    }

    /// Look up a voice by id.
    pub fn voice(&self, id: &str) -> Option<&CatalogVoice> {
        self.voices.iter().find(|v| v.id == id)
    }
}

fn normalize_keys(table: HashMap<String, String>) -> HashMap<String, String> {
    table
        .into_iter()
        .map(|(k, v)| (normalize_alias(&k), v))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect()
}

/// Normalize an alias into a lookup key.
///
/// Lowercase, trim, whitespace runs and other punctuation to `_`, repeated
/// underscores collapsed, edge underscores removed.
///
/// # Examples
///
/// ```
/// use taleweaver_voice::normalize_alias;
///
/// assert_eq!(normalize_alias("  James - Husky & Engaging "), "james_husky_engaging");
/// assert_eq!(normalize_alias("W. Storytime Oxley"), "w_storytime_oxley");
/// ```
pub fn normalize_alias(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().chars() {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '_'
        };
        if mapped == '_' && key.ends_with('_') {
            continue;
        }
        key.push(mapped);
    }
    key.trim_matches('_').to_string()
}
