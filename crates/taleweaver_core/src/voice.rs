//! Voice settings and resolved voice profiles.

use serde::{Deserialize, Serialize};

/// Expressive controls sent with every speech synthesis call.
///
/// Accepts both `similarityBoost` and the provider's `similarity_boost`
/// spelling; missing fields take the default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSettings {
    /// Voice stability (0..1)
    pub stability: f64,
    /// Similarity boost (0..1)
    #[serde(alias = "similarity_boost")]
    pub similarity_boost: f64,
    /// Style exaggeration (0..1)
    pub style: f64,
    /// Playback speed multiplier
    pub speed: f64,
}

impl VoiceSettings {
    /// Construct settings from the four controls.
    pub const fn new(stability: f64, similarity_boost: f64, style: f64, speed: f64) -> Self {
        Self {
            stability,
            similarity_boost,
            style,
            speed,
        }
    }

    /// Settings used for page narration when a timeline carries none.
    pub const fn narration_fallback() -> Self {
        Self::new(0.85, 0.8, 0.2, 1.0)
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::new(0.5, 0.75, 0.0, 1.0)
    }
}

/// A voice id paired with the settings to speak with.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{VoiceProfile, VoiceSettings};
///
/// let profile = VoiceProfile::new("EkK5I93UQWFDigLMpZcX", VoiceSettings::default());
/// let json = serde_json::to_value(&profile).unwrap();
/// assert_eq!(json["voiceId"], "EkK5I93UQWFDigLMpZcX");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    /// Provider voice id
    pub voice_id: String,
    /// Settings to synthesize with
    pub voice_settings: VoiceSettings,
}

impl VoiceProfile {
    /// Create a new profile.
    pub fn new(voice_id: impl Into<String>, voice_settings: VoiceSettings) -> Self {
        Self {
            voice_id: voice_id.into(),
            voice_settings,
        }
    }
}
