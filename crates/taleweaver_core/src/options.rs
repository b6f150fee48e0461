//! Story generation options.

use crate::Character;
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use taleweaver_error::{BuilderError, ValidationError};

/// Parameters for generating a story.
///
/// Serializes in camelCase; this is the user payload sent to the generator.
///
/// # Examples
///
/// ```
/// use taleweaver_core::StoryOptions;
///
/// let options = StoryOptions::builder()
///     .theme("friendship")
///     .genre("adventure")
///     .target_age_group("5-7")
///     .story_length(2u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(*options.story_length(), 2);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct StoryOptions {
    /// Central theme
    theme: String,
    /// Genre
    genre: String,
    /// Target age group, e.g. `5-7`
    target_age_group: String,
    /// Number of pages to generate
    #[builder(default = "6")]
    story_length: u32,
    /// Illustration style
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    art_style: Option<String>,
    /// Narration tone, used for narrator selection
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    narration_tone: Option<String>,
    /// Protagonist
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    main_character: Option<Character>,
    /// Supporting cast
    #[builder(default)]
    #[serde(default)]
    supporting_characters: Vec<Character>,
    /// Resolved narrator voice id suggested to the generator
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    narration_voice_id: Option<String>,
}

impl StoryOptionsBuilder {
    /// Build the options.
    ///
    /// # Errors
    ///
    /// Returns error if a required field is unset.
    pub fn build(&self) -> Result<StoryOptions, BuilderError> {
        self.build_internal()
            .map_err(|e| BuilderError::from(e.to_string()))
    }
}

impl StoryOptions {
    /// Creates a new builder.
    pub fn builder() -> StoryOptionsBuilder {
        StoryOptionsBuilder::default()
    }

    /// Check that the required fields carry values.
    ///
    /// # Errors
    ///
    /// Lists every blank required field in one message.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.theme.trim().is_empty() {
            missing.push("theme");
        }
        if self.genre.trim().is_empty() {
            missing.push("genre");
        }
        if self.target_age_group.trim().is_empty() {
            missing.push("targetAgeGroup");
        }
        if self.story_length == 0 {
            missing.push("storyLength");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::missing_fields(&missing))
        }
    }

    /// Every requested character, protagonist first.
    pub fn cast(&self) -> Vec<Character> {
        self.main_character
            .iter()
            .chain(self.supporting_characters.iter())
            .cloned()
            .collect()
    }

    /// Copy of these options with the narrator voice id filled in.
    pub fn with_narration_voice_id(&self, voice_id: impl Into<String>) -> Self {
        Self {
            narration_voice_id: Some(voice_id.into()),
            ..self.clone()
        }
    }
}
