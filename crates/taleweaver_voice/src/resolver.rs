//! Voice resolution.

use crate::{EmotionPreset, GenderVoices, VoiceCatalog, normalize_alias};
use std::sync::Arc;
use taleweaver_core::{Character, Gender, VoiceProfile, VoiceSettings};
use taleweaver_error::TaleweaverResult;

/// Settings used for character voices when nothing more specific applies.
const CHARACTER_SETTINGS: VoiceSettings = VoiceSettings::new(0.55, 0.75, 0.5, 1.0);

/// Settings for an explicitly chosen narrator voice.
const EXPLICIT_NARRATOR_SETTINGS: VoiceSettings = VoiceSettings::new(0.5, 0.85, 0.2, 1.0);

/// Which fallback table a lookup belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum VoiceCategory {
    /// Story narrator
    Narrator,
    /// Speaking character
    Character,
}

/// Narration tone inferred from a free-form tone label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum NarrationTone {
    /// Bedtime and young readers
    Children,
    /// Energetic adventure
    Adventure,
    /// Calm and slow
    Meditation,
    /// Documentary register
    Professional,
    /// Everything else
    Default,
}

impl NarrationTone {
    /// Classify a tone label by keyword.
    pub fn from_label(label: &str) -> Self {
        let lowered = label.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lowered.contains(w));
        if has(&["child", "kid", "bedtime", "soothing"]) {
            NarrationTone::Children
        } else if has(&["adventure", "epic", "exciting"]) {
            NarrationTone::Adventure
        } else if has(&["calm", "meditat", "relax"]) {
            NarrationTone::Meditation
        } else if has(&["professional", "formal", "documentary"]) {
            NarrationTone::Professional
        } else {
            NarrationTone::Default
        }
    }
}

/// Character archetype used to pick a voice from the role × gender table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CharacterRole {
    /// Young protagonist
    YoungHero,
    /// Protagonist
    Hero,
    /// Antagonist
    Villain,
    /// Wise guide
    Mentor,
    /// Companion
    Sidekick,
    /// Magical or otherworldly
    Mystical,
}

impl CharacterRole {
    /// Infer a role from an explicit hint and trait words.
    ///
    /// # Examples
    ///
    /// ```
    /// use taleweaver_voice::CharacterRole;
    ///
    /// let traits = vec!["cunning".to_string(), "villain".to_string()];
    /// assert_eq!(CharacterRole::infer(None, &traits), CharacterRole::Villain);
    /// assert_eq!(CharacterRole::infer(Some("young hero"), &[]), CharacterRole::YoungHero);
    /// assert_eq!(CharacterRole::infer(None, &[]), CharacterRole::Hero);
    /// ```
    pub fn infer(role: Option<&str>, traits: &[String]) -> Self {
        let mut words = role.unwrap_or_default().to_lowercase();
        for t in traits {
            words.push(' ');
            words.push_str(&t.to_lowercase());
        }
        let has = |needles: &[&str]| needles.iter().any(|n| words.contains(n));
        if has(&["villain", "evil", "wicked", "antagonist", "sinister"]) {
            CharacterRole::Villain
        } else if has(&["mentor", "wise", "teacher", "elder", "guide"]) {
            CharacterRole::Mentor
        } else if has(&["sidekick", "companion", "loyal", "friend"]) {
            CharacterRole::Sidekick
        } else if has(&["mystical", "magic", "oracle", "spirit", "fairy", "wizard"]) {
            CharacterRole::Mystical
        } else if has(&["young", "child", "kid", "little"]) {
            CharacterRole::YoungHero
        } else {
            CharacterRole::Hero
        }
    }
}

/// Resolves aliases, tones and characters to provider voices.
///
/// Pure lookups over an injected [`VoiceCatalog`].
///
/// # Examples
///
/// ```
/// use taleweaver_voice::{VoiceCategory, VoiceResolver};
///
/// let resolver = VoiceResolver::builtin().unwrap();
/// assert_eq!(
///     resolver.resolve_id(Some("Hope - Soothing Narrator"), VoiceCategory::Narrator),
///     "iCrDUkL56s3C8sCRl7wb"
/// );
/// assert_eq!(
///     resolver.resolve_id(Some("AbCdEfGhIjKlMn"), VoiceCategory::Narrator),
///     "AbCdEfGhIjKlMn"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct VoiceResolver {
    catalog: Arc<VoiceCatalog>,
}

impl VoiceResolver {
    /// Create a resolver over `catalog`.
    pub fn new(catalog: Arc<VoiceCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolver over the bundled catalog.
    pub fn builtin() -> TaleweaverResult<Self> {
        Ok(Self::new(Arc::new(VoiceCatalog::builtin()?)))
    }

    /// The injected catalog.
    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    /// Whether `value` already looks like a provider voice id.
    pub fn is_voice_id(value: &str) -> bool {
        value.len() >= 12 && !value.chars().any(char::is_whitespace)
    }

    /// Resolve an id or alias, falling back to the category default.
    pub fn resolve_id(&self, name_or_id: Option<&str>, category: VoiceCategory) -> String {
        let Some(value) = name_or_id.map(str::trim).filter(|v| !v.is_empty()) else {
            return self.default_id(category).to_string();
        };
        if Self::is_voice_id(value) {
            return value.to_string();
        }
        match self.lookup_alias(value, category) {
            Some(id) => id,
            None => {
                tracing::debug!(alias = value, %category, "Unknown voice alias, using default");
                self.default_id(category).to_string()
            }
        }
    }

    /// Look up an alias without falling back.
    ///
    /// Tries the lightly normalized key, then the fully normalized key (in
    /// the category table first), then voice display-name prefixes.
    pub fn lookup_alias(&self, alias: &str, category: VoiceCategory) -> Option<String> {
        let (primary, secondary) = match category {
            VoiceCategory::Narrator => (
                self.catalog.narrator_aliases(),
                self.catalog.character_aliases(),
            ),
            VoiceCategory::Character => (
                self.catalog.character_aliases(),
                self.catalog.narrator_aliases(),
            ),
        };

        let exact = exact_key(alias);
        let normalized = normalize_alias(alias);
        for key in [&exact, &normalized] {
            if let Some(id) = primary.get(key).or_else(|| secondary.get(key)) {
                return Some(id.clone());
            }
        }

        self.lookup_display_name(&normalized)
    }

    fn lookup_display_name(&self, normalized: &str) -> Option<String> {
        if normalized.is_empty() {
            return None;
        }
        self.catalog
            .voices()
            .iter()
            .find(|voice| {
                let name = normalize_alias(&voice.name);
                let first_word = name.split('_').next().unwrap_or_default();
                (normalized.len() >= 3 && name.starts_with(normalized))
                    || (first_word.len() >= 3 && normalized.starts_with(first_word))
            })
            .map(|voice| voice.id.clone())
    }

    /// Default id for a category.
    pub fn default_id(&self, category: VoiceCategory) -> &str {
        match category {
            VoiceCategory::Narrator => self.catalog.default_narrator(),
            VoiceCategory::Character => self.catalog.default_character(),
        }
    }

    /// Narrator for an explicitly requested id or alias.
    pub fn explicit_narrator(&self, name_or_id: &str) -> VoiceProfile {
        VoiceProfile::new(
            self.resolve_id(Some(name_or_id), VoiceCategory::Narrator),
            EXPLICIT_NARRATOR_SETTINGS,
        )
    }

    /// Narrator matched to a narration tone label.
    pub fn narrator_for_tone(&self, tone: Option<&str>) -> VoiceProfile {
        let tone = NarrationTone::from_label(tone.unwrap_or_default());
        let voice_id = self
            .catalog
            .tones()
            .get(tone.as_ref())
            .map(String::as_str)
            .unwrap_or_else(|| self.catalog.default_narrator());
        VoiceProfile::new(voice_id, EmotionPreset::Narrative.settings())
    }

    /// Voice for a character from its role, traits and gender.
    ///
    /// A generator-suggested id or alias wins over the table.
    pub fn character_profile(&self, character: &Character, suggested: Option<&str>) -> VoiceProfile {
        if let Some(id) = suggested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| {
                if Self::is_voice_id(s) {
                    Some(s.to_string())
                } else {
                    self.lookup_alias(s, VoiceCategory::Character)
                }
            })
        {
            return VoiceProfile::new(id, CHARACTER_SETTINGS);
        }

        let role = CharacterRole::infer(character.role.as_deref(), &character.traits);
        let voice_id = self
            .table_voice(character.gender, role)
            .unwrap_or_else(|| self.catalog.default_character().to_string());
        VoiceProfile::new(voice_id, CHARACTER_SETTINGS)
    }

    fn table_voice(&self, gender: Gender, role: CharacterRole) -> Option<String> {
        let table = self.catalog.characters();
        let voices: &GenderVoices = match gender {
            Gender::Male => table.male(),
            Gender::Female => table.female(),
            Gender::NonBinary => {
                let nb = table.non_binary();
                let pick = match role {
                    CharacterRole::Villain | CharacterRole::Mystical => nb.mystical(),
                    _ => nb.neutral(),
                };
                return pick.clone().or_else(|| nb.neutral().clone());
            }
        };
        let pick = match role {
            CharacterRole::YoungHero => voices.young_hero(),
            CharacterRole::Hero => voices.hero(),
            CharacterRole::Villain => voices.villain(),
            CharacterRole::Mentor => voices.mentor(),
            CharacterRole::Sidekick => voices.sidekick(),
            CharacterRole::Mystical => table.non_binary().mystical(),
        };
        pick.clone().or_else(|| voices.hero().clone())
    }

    /// Default settings applied to character voices.
    pub const fn character_settings() -> VoiceSettings {
        CHARACTER_SETTINGS
    }
}

fn exact_key(alias: &str) -> String {
    alias
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
