//! Request and response bodies.
//!
//! Request bodies are lenient: every field is optional at the serde level
//! so that missing values produce the service's own validation messages
//! rather than deserializer errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taleweaver_core::{
    Character, Gender, Page, PageAssets, PageState, PageStatus, PipelineJob, StoryLogEntry,
    StoryOptions, StorySummary, VoiceSettings, normalize_timeline, parse_traits,
};
use taleweaver_error::{TaleweaverResult, ValidationError};
use taleweaver_interface::VoiceSample;
use taleweaver_pipeline::{
    BuildRequest, IllustrateRequest, NarratorChoice, PageInput, USER_VOICE_NAME,
};
use taleweaver_storage::decode_base64;

/// Page count used when `storyLength` is present but not a usable number.
const DEFAULT_STORY_LENGTH: u32 = 6;

/// A character as sent by clients: a `"Name|gender|traits"` descriptor or
/// an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CharacterInput {
    /// `"Name|gender|traits"`
    Descriptor(String),
    /// `{name, gender?, traits?, description?, role?}`; traits may be a
    /// list or a comma separated string
    Object {
        /// Display name
        #[serde(default)]
        name: Option<String>,
        /// Gender label
        #[serde(default)]
        gender: Option<String>,
        /// Trait list or string
        #[serde(default)]
        traits: Option<Value>,
        /// Free-form description
        #[serde(default)]
        description: Option<String>,
        /// Role hint
        #[serde(default)]
        role: Option<String>,
    },
}

impl CharacterInput {
    /// The character, or `None` when it has no name.
    pub fn into_character(self) -> Option<Character> {
        match self {
            CharacterInput::Descriptor(descriptor) => Character::from_descriptor(&descriptor).ok(),
            CharacterInput::Object {
                name,
                gender,
                traits,
                description,
                role,
            } => {
                let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
                let traits = match traits {
                    Some(Value::String(raw)) => parse_traits(&raw),
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .flat_map(parse_traits)
                        .collect(),
                    _ => Vec::new(),
                };
                Some(Character {
                    name,
                    gender: gender.as_deref().map(Gender::from_label).unwrap_or_default(),
                    traits,
                    description,
                    role,
                })
            }
        }
    }
}

/// Body of `/generate`, `/build` and `/bundle`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryBody {
    /// Central theme
    pub theme: Option<String>,
    /// Genre
    pub genre: Option<String>,
    /// Target age group
    pub target_age_group: Option<String>,
    /// Page count, as a number or numeric string
    pub story_length: Option<Value>,
    /// Illustration style
    pub art_style: Option<String>,
    /// Illustration aspect ratio
    pub aspect_ratio: Option<String>,
    /// Narration tone
    pub narration_tone: Option<String>,
    /// Protagonist
    pub main_character: Option<CharacterInput>,
    /// Supporting cast
    pub supporting_characters: Vec<CharacterInput>,
    /// Explicit narrator voice id or alias
    pub narration_voice_id: Option<String>,
    /// Narrator alias
    pub narration_voice_alias: Option<String>,
    /// Recording of the user's voice, base64
    pub voice_sample_base64: Option<String>,
    /// Recording format, `mp3` by default
    pub voice_sample_format: Option<String>,
    /// Narrate with a clone of the recording
    pub use_user_voice_for_narration: bool,
    /// Synthesize page audio (bundle), default true
    pub create_audio: Option<bool>,
    /// Generate illustrations (bundle), default true
    pub create_images: Option<bool>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn length_given(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

impl StoryBody {
    /// Names of the required fields that are missing, in request order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !filled(&self.theme) {
            missing.push("theme");
        }
        if !filled(&self.genre) {
            missing.push("genre");
        }
        if !filled(&self.target_age_group) {
            missing.push("targetAgeGroup");
        }
        if !length_given(&self.story_length) {
            missing.push("storyLength");
        }
        missing
    }

    /// Requested page count. Unusable values fall back to six pages.
    pub fn story_length(&self) -> u32 {
        let parsed = match &self.story_length {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|n| n.is_finite() && *n >= 1.0)
            .map(|n| n.floor().min(f64::from(u32::MAX)) as u32)
            .unwrap_or(DEFAULT_STORY_LENGTH)
    }

    /// Story generation options.
    ///
    /// # Errors
    ///
    /// Validation error naming every missing required field.
    pub fn options(&self) -> TaleweaverResult<StoryOptions> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            Err(ValidationError::missing_fields(&missing))?
        }

        let options = StoryOptions::builder()
            .theme(self.theme.as_deref().unwrap_or_default().trim())
            .genre(self.genre.as_deref().unwrap_or_default().trim())
            .target_age_group(self.target_age_group.as_deref().unwrap_or_default().trim())
            .story_length(self.story_length())
            .art_style(self.art_style.clone().filter(|s| !s.trim().is_empty()))
            .narration_tone(self.narration_tone.clone().filter(|t| !t.trim().is_empty()))
            .main_character(self.main_character.clone().and_then(CharacterInput::into_character))
            .supporting_characters(
                self.supporting_characters
                    .iter()
                    .cloned()
                    .filter_map(CharacterInput::into_character)
                    .collect::<Vec<_>>(),
            )
            .build()?;
        Ok(options)
    }

    /// Narrator selection.
    ///
    /// The recording is only decoded when the user voice is requested.
    ///
    /// # Errors
    ///
    /// Validation error for a recording that is not base64.
    pub fn narrator(&self) -> TaleweaverResult<NarratorChoice> {
        let sample = match &self.voice_sample_base64 {
            Some(encoded) if self.use_user_voice_for_narration && !encoded.trim().is_empty() => {
                let bytes = decode_base64(encoded).map_err(|_| {
                    ValidationError::new("voiceSampleBase64 is not valid base64.")
                })?;
                Some(VoiceSample {
                    bytes,
                    format: self
                        .voice_sample_format
                        .clone()
                        .filter(|f| !f.trim().is_empty())
                        .unwrap_or_else(|| "mp3".to_string()),
                    name: USER_VOICE_NAME.to_string(),
                })
            }
            _ => None,
        };

        Ok(NarratorChoice {
            voice_id: self.narration_voice_id.clone(),
            voice_alias: self.narration_voice_alias.clone(),
            sample,
            use_user_voice: self.use_user_voice_for_narration,
            tone: self.narration_tone.clone(),
        })
    }

    /// Full build request.
    ///
    /// # Errors
    ///
    /// As [`StoryBody::options`] and [`StoryBody::narrator`].
    pub fn build_request(&self) -> TaleweaverResult<BuildRequest> {
        let mut request = BuildRequest::new(self.options()?)
            .with_narrator(self.narrator()?)
            .with_create_audio(self.create_audio.unwrap_or(true))
            .with_create_images(self.create_images.unwrap_or(true));
        if let Some(ratio) = self.aspect_ratio.clone().filter(|r| !r.trim().is_empty()) {
            request = request.with_aspect_ratio(ratio);
        }
        Ok(request)
    }
}

/// Body of `/narrate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrateBody {
    /// Text to speak
    pub text: Option<String>,
    /// Voice id or alias
    pub voice_id: Option<String>,
    /// Voice settings
    pub voice_settings: Option<VoiceSettings>,
}

/// Body of `/illustrate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IllustrateBody {
    /// Scene description
    pub prompt: Option<String>,
    /// Page the image is for
    pub page_number: Option<u32>,
    /// Style override
    pub art_style: Option<String>,
    /// Aspect ratio override
    pub aspect_ratio: Option<String>,
    /// Seed
    pub seed: Option<u64>,
}

impl From<IllustrateBody> for IllustrateRequest {
    fn from(body: IllustrateBody) -> Self {
        Self {
            prompt: body.prompt.unwrap_or_default(),
            page_number: body.page_number,
            art_style: body.art_style,
            aspect_ratio: body.aspect_ratio,
            seed: body.seed,
        }
    }
}

/// A page in a batch request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageBody {
    /// Page number
    #[serde(alias = "page")]
    pub page_number: Option<u32>,
    /// Illustration prompt
    #[serde(alias = "image_prompt")]
    pub image_prompt: Option<String>,
    /// Raw timeline entries
    pub timeline: Vec<Value>,
}

impl From<PageBody> for PageInput {
    fn from(body: PageBody) -> Self {
        Self {
            page_number: body.page_number,
            image_prompt: body.image_prompt,
            timeline: normalize_timeline(&body.timeline).beats,
        }
    }
}

/// Body of `/narrate-pages`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarratePagesBody {
    /// Pages to narrate
    pub pages: Vec<PageBody>,
    /// Narrator voice id
    pub voice_id: Option<String>,
    /// Narrator alias, preferred over the id
    pub voice_alias: Option<String>,
}

/// Body of `/generate-images`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateImagesBody {
    /// Pages to illustrate
    pub pages: Vec<PageBody>,
    /// Style for every page
    pub art_style: Option<String>,
    /// Aspect ratio for every page
    pub aspect_ratio: Option<String>,
}

/// `GET /{storyId}/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Title, logline and cast
    pub story: StorySummary,
    /// Page states in page order
    pub pages: Vec<PageState>,
    /// Share of terminal pages
    pub progress: f64,
    /// When the job was created
    pub created_at: DateTime<Utc>,
}

impl From<PipelineJob> for StatusResponse {
    fn from(job: PipelineJob) -> Self {
        Self {
            story: job.story.summary(),
            pages: job.pages,
            progress: job.progress,
            created_at: job.created_at,
        }
    }
}

/// `GET /{storyId}/page/{pageNumber}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    /// Page number
    pub page_number: u32,
    /// Build status
    pub status: PageStatus,
    /// Stored assets
    pub assets: PageAssets,
    /// Page text and timeline
    pub content: Page,
}

/// `GET /{storyId}/logs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    /// Job id
    pub story_id: String,
    /// Every page log, oldest first
    pub logs: Vec<StoryLogEntry>,
}
