//! Request and response types exchanged with collaborators.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taleweaver_core::VoiceSettings;
use taleweaver_error::BuilderError;

/// Text-to-speech request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Provider voice id
    pub voice_id: String,
    /// Expressive settings
    pub voice_settings: VoiceSettings,
}

impl SpeechRequest {
    /// Create a request.
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        voice_settings: VoiceSettings,
    ) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            voice_settings,
        }
    }
}

/// Sound effect request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundEffectRequest {
    /// What the effect sounds like
    pub description: String,
    /// Onomatopoeia, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Requested length; the provider picks when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// Encoded audio returned by a provider or the mixer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded bytes
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `audio/mpeg`
    pub content_type: String,
}

impl AudioClip {
    /// An MP3 clip.
    pub fn mp3(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "audio/mpeg".to_string(),
        }
    }
}

/// What produced an audio segment.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SegmentKind {
    /// Narrator line
    Narration,
    /// Dialogue line
    Character(String),
    /// Sound effect
    Sfx,
}

/// One ordered piece of page audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    /// Timeline index of the source beat
    pub beat_index: usize,
    /// Source beat kind
    pub kind: SegmentKind,
    /// Encoded audio
    pub clip: AudioClip,
}

/// Illustration request.
///
/// # Examples
///
/// ```
/// use taleweaver_interface::ImageRequest;
///
/// let request = ImageRequest::builder()
///     .prompt("A lighthouse at dusk")
///     .seed(42u64)
///     .build()
///     .unwrap();
/// assert_eq!(request.art_style(), "storybook");
/// assert_eq!(request.aspect_ratio(), "3:2");
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct ImageRequest {
    /// Scene description
    prompt: String,
    /// Shared seed for visual consistency across pages
    #[builder(default)]
    seed: Option<u64>,
    /// Art style label
    #[builder(default = "\"storybook\".to_string()")]
    art_style: String,
    /// Aspect ratio, e.g. `3:2`
    #[builder(default = "\"3:2\".to_string()")]
    aspect_ratio: String,
    /// Output width in pixels
    #[builder(default)]
    width: Option<u32>,
    /// Output height in pixels
    #[builder(default)]
    height: Option<u32>,
    /// Page the image is for
    #[builder(default)]
    page_number: Option<u32>,
}

impl ImageRequestBuilder {
    /// Build the request.
    ///
    /// # Errors
    ///
    /// Returns error if the prompt is unset.
    pub fn build(&self) -> Result<ImageRequest, BuilderError> {
        self.build_internal()
            .map_err(|e| BuilderError::from(e.to_string()))
    }
}

impl ImageRequest {
    /// Creates a new builder.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// Generated illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illustration {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type
    pub content_type: String,
    /// Seed the provider used
    pub seed: Option<u64>,
    /// Provider request id
    pub request_id: Option<String>,
}

/// Recorded voice used for cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSample {
    /// Encoded audio
    pub bytes: Vec<u8>,
    /// File extension, e.g. `mp3`
    pub format: String,
    /// Name to register the cloned voice under
    pub name: String,
}

/// A voice offered by the speech provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSummary {
    /// Provider voice id
    pub voice_id: String,
    /// Display name
    pub name: String,
    /// Provider category (premade, cloned, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Provider labels (accent, gender, ...)
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Sample audio URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}
