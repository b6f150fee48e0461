//! Collaborator traits.

use crate::{
    AudioClip, AudioSegment, Illustration, ImageRequest, SoundEffectRequest, SpeechRequest,
    VoiceSample, VoiceSummary,
};
use async_trait::async_trait;
use taleweaver_core::{PagePatch, ParsedStory, PipelineJob, Story, StoryLogEntry, StoryOptions};
use taleweaver_error::TaleweaverResult;

/// Produces a structured story from generation options.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate and parse a story. One blocking upstream call.
    async fn generate_story(&self, options: &StoryOptions) -> TaleweaverResult<ParsedStory>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;
}

/// Text-to-speech and related audio services.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` with the requested voice.
    async fn synthesize(&self, request: &SpeechRequest) -> TaleweaverResult<AudioClip>;

    /// Generate a sound effect from a description.
    async fn sound_effect(&self, request: &SoundEffectRequest) -> TaleweaverResult<AudioClip>;

    /// Register a voice from a sample and return its id.
    async fn clone_voice(&self, sample: &VoiceSample) -> TaleweaverResult<String>;

    /// Voices available to this account.
    async fn list_voices(&self) -> TaleweaverResult<Vec<VoiceSummary>>;
}

/// Illustration generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image.
    async fn generate_image(&self, request: &ImageRequest) -> TaleweaverResult<Illustration>;
}

/// Combines ordered audio segments into one clip.
#[async_trait]
pub trait AudioMixer: Send + Sync {
    /// Mix `segments` in order.
    ///
    /// # Errors
    ///
    /// Returns a mixing error when there is nothing to mix or the segments
    /// cannot be combined.
    async fn mix(&self, segments: &[AudioSegment]) -> TaleweaverResult<AudioClip>;
}

/// Storage for in-flight and finished story builds.
///
/// Reads return cloned snapshots; writers are the owning build task.
#[async_trait]
pub trait StoryStateStore: Send + Sync {
    /// Create a job with every page pending and return its id.
    async fn create(&self, story: Story) -> TaleweaverResult<String>;

    /// Snapshot of a job.
    async fn get(&self, story_id: &str) -> Option<PipelineJob>;

    /// Apply a patch to one page and recompute progress.
    async fn update_page(
        &self,
        story_id: &str,
        page_number: u32,
        patch: PagePatch,
    ) -> TaleweaverResult<()>;

    /// Append a timestamped message to a page log.
    async fn append_log(
        &self,
        story_id: &str,
        page_number: u32,
        message: String,
    ) -> TaleweaverResult<()>;

    /// Flattened log view across pages, oldest first.
    async fn logs(&self, story_id: &str) -> TaleweaverResult<Vec<StoryLogEntry>>;
}
