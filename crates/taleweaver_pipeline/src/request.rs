//! Story build requests.

use crate::NarratorChoice;
use taleweaver_core::StoryOptions;

/// Everything needed to build a story.
///
/// # Examples
///
/// ```
/// use taleweaver_core::StoryOptions;
/// use taleweaver_pipeline::BuildRequest;
///
/// let options = StoryOptions::builder()
///     .theme("courage")
///     .genre("fantasy")
///     .target_age_group("5-7")
///     .build()
///     .unwrap();
/// let request = BuildRequest::new(options).with_create_images(false);
/// assert!(request.create_audio);
/// assert!(!request.create_images);
/// ```
#[derive(Debug, Clone, PartialEq, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct BuildRequest {
    /// Story generation options
    pub options: StoryOptions,
    /// Narrator selection
    pub narrator: NarratorChoice,
    /// Synthesize page audio
    pub create_audio: bool,
    /// Generate illustrations
    pub create_images: bool,
    /// Illustration style override
    #[setters(strip_option)]
    pub art_style: Option<String>,
    /// Illustration aspect ratio override
    #[setters(strip_option)]
    pub aspect_ratio: Option<String>,
}

impl BuildRequest {
    /// Request with every asset enabled and the tone narrator.
    pub fn new(options: StoryOptions) -> Self {
        let narrator = NarratorChoice {
            tone: options.narration_tone().clone(),
            ..Default::default()
        };
        Self {
            options,
            narrator,
            create_audio: true,
            create_images: true,
            art_style: None,
            aspect_ratio: None,
        }
    }
}
