//! Emotion presets for expressive delivery.

use std::str::FromStr;
use taleweaver_core::VoiceSettings;

/// Named delivery presets with fixed voice settings.
///
/// Common synonyms parse to the nearest preset (`angry` → `Anger`,
/// `happy` → `Joy`, `neutral` → `Calm`).
///
/// # Examples
///
/// ```
/// use taleweaver_voice::EmotionPreset;
///
/// let preset = EmotionPreset::from_label("Angry").unwrap();
/// assert_eq!(preset, EmotionPreset::Anger);
/// assert_eq!(preset.settings().style, 0.9);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmotionPreset {
    /// Neutral tone, steady delivery
    #[strum(to_string = "calm", serialize = "neutral", serialize = "soothing")]
    Calm,
    /// Balanced narrator delivery
    Narrative,
    /// Inquisitive, wondering
    #[strum(to_string = "curious", serialize = "wonder", serialize = "inquisitive")]
    Curious,
    /// Intense, sharp articulation
    #[strum(to_string = "anger", serialize = "angry", serialize = "furious")]
    Anger,
    /// Shaky, hesitant
    #[strum(to_string = "fear", serialize = "scared", serialize = "afraid", serialize = "nervous")]
    Fear,
    /// Slower, softer
    #[strum(to_string = "sadness", serialize = "sad", serialize = "melancholy")]
    Sadness,
    /// Bright, cheerful
    #[strum(to_string = "joy", serialize = "happy", serialize = "excited", serialize = "cheerful")]
    Joy,
    /// Confident and bold
    #[strum(to_string = "determined", serialize = "brave", serialize = "confident")]
    Determined,
    /// Whisper-like, controlled
    #[strum(to_string = "mysterious", serialize = "whisper")]
    Mysterious,
    /// Deep, dramatic
    #[strum(to_string = "villainous", serialize = "menacing", serialize = "sinister")]
    Villainous,
}

impl EmotionPreset {
    /// Parse an emotion label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::from_str(label.trim()).ok()
    }

    /// Voice settings for this preset.
    pub const fn settings(&self) -> VoiceSettings {
        match self {
            EmotionPreset::Calm => VoiceSettings::new(0.85, 0.8, 0.2, 1.0),
            EmotionPreset::Narrative => VoiceSettings::new(0.9, 0.9, 0.15, 1.0),
            EmotionPreset::Curious => VoiceSettings::new(0.6, 0.7, 0.7, 1.05),
            EmotionPreset::Anger => VoiceSettings::new(0.4, 0.7, 0.9, 0.95),
            EmotionPreset::Fear => VoiceSettings::new(0.5, 0.6, 0.8, 1.05),
            EmotionPreset::Sadness => VoiceSettings::new(0.5, 0.7, 0.7, 0.9),
            EmotionPreset::Joy => VoiceSettings::new(0.6, 0.6, 0.8, 1.1),
            EmotionPreset::Determined => VoiceSettings::new(0.5, 0.7, 0.8, 1.0),
            EmotionPreset::Mysterious => VoiceSettings::new(0.7, 0.8, 0.4, 0.95),
            EmotionPreset::Villainous => VoiceSettings::new(0.45, 0.7, 0.85, 0.95),
        }
    }
}
