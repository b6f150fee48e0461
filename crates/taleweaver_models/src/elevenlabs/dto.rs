//! ElevenLabs wire types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taleweaver_core::VoiceSettings;
use taleweaver_interface::VoiceSummary;

/// Voice settings in the provider's snake_case shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevenLabsVoiceSettings {
    /// Voice stability
    pub stability: f64,
    /// Similarity boost
    pub similarity_boost: f64,
    /// Style exaggeration
    pub style: f64,
    /// Playback speed
    pub speed: f64,
    /// Always on for storybook voices
    pub use_speaker_boost: bool,
}

impl From<VoiceSettings> for ElevenLabsVoiceSettings {
    fn from(settings: VoiceSettings) -> Self {
        Self {
            stability: settings.stability,
            similarity_boost: settings.similarity_boost,
            style: settings.style,
            speed: settings.speed,
            use_speaker_boost: true,
        }
    }
}

/// `POST /v1/text-to-speech/{voice_id}` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextToSpeechRequest {
    /// Text to speak
    pub text: String,
    /// Speech model
    pub model_id: String,
    /// Delivery settings
    pub voice_settings: ElevenLabsVoiceSettings,
}

/// `POST /v1/sound-generation` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundGenerationRequest {
    /// Sound description
    pub text: String,
    /// Length in seconds; omitted lets the provider choose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// How literally to follow the description
    pub prompt_influence: f64,
}

/// A voice from `GET /v2/voices`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElevenLabsVoice {
    /// Voice id
    pub voice_id: String,
    /// Display name
    pub name: String,
    /// premade, cloned, generated, ...
    #[serde(default)]
    pub category: Option<String>,
    /// Accent, gender, age, ...
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Sample audio
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl From<ElevenLabsVoice> for VoiceSummary {
    fn from(voice: ElevenLabsVoice) -> Self {
        VoiceSummary {
            voice_id: voice.voice_id,
            name: voice.name,
            category: voice.category,
            labels: voice.labels,
            preview_url: voice.preview_url,
        }
    }
}

/// `GET /v2/voices` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VoicesResponse {
    /// One page of voices
    #[serde(default)]
    pub voices: Vec<ElevenLabsVoice>,
    /// Voices across every page
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// `POST /v1/voices/add` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddVoiceResponse {
    /// Id of the new voice
    pub voice_id: String,
}
