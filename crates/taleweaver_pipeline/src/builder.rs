//! Per-page asset builder.
//!
//! One page at a time: the timeline is spoken beat by beat into ordered
//! segments, mixed into a single track and stored, while the illustration
//! is generated alongside. Nothing here returns an error. Each failure is
//! recorded as a [`PageError`] and the page carries on with what it has.

use std::sync::Arc;
use taleweaver_core::{AssetRef, Beat, ErrorStage, Page, PageError, PageStatus, VoiceProfile};
use taleweaver_interface::{
    AudioMixer, AudioSegment, ImageGenerator, ImageRequest, SegmentKind,
    SoundEffectRequest, SpeechRequest, SpeechSynthesizer,
};
use taleweaver_storage::{AssetStorage, MediaType};
use taleweaver_voice::{VoiceCache, sfx_duration_hint};
use tracing::{debug, info, instrument, warn};

/// Per-build settings shared by every page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBuildOptions {
    /// Synthesize page audio
    pub audio: bool,
    /// Generate illustrations
    pub images: bool,
    /// Illustration style
    pub art_style: String,
    /// Illustration aspect ratio
    pub aspect_ratio: String,
    /// Illustration width in pixels
    pub width: Option<u32>,
    /// Illustration height in pixels
    pub height: Option<u32>,
    /// Story-wide image seed
    pub seed: Option<u64>,
}

impl Default for PageBuildOptions {
    fn default() -> Self {
        Self {
            audio: true,
            images: true,
            art_style: "storybook".to_string(),
            aspect_ratio: "3:2".to_string(),
            width: None,
            height: None,
            seed: None,
        }
    }
}

/// Everything a page needs from its story build.
///
/// Established once before the page fan-out and shared read-only.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Owning story, used in asset paths
    pub story_id: String,
    /// Narrator voice
    pub narrator: VoiceProfile,
    /// Character voices
    pub voices: Arc<VoiceCache>,
    /// Build settings
    pub options: PageBuildOptions,
}

/// Outcome of building one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBuild {
    /// Stored page audio
    pub audio: Option<AssetRef>,
    /// Stored illustration
    pub image: Option<AssetRef>,
    /// Partial failures, in the order they happened
    pub errors: Vec<PageError>,
    /// Audio was enabled and the timeline had beats
    pub audio_requested: bool,
    /// Images were enabled and the page had a prompt
    pub image_requested: bool,
}

impl PageBuild {
    /// Terminal status for this outcome.
    ///
    /// A missing illustration alone never fails a page. Missing audio does
    /// when it was requested, and so does producing nothing at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use taleweaver_core::PageStatus;
    /// use taleweaver_pipeline::PageBuild;
    ///
    /// let build = PageBuild {
    ///     audio_requested: true,
    ///     image_requested: true,
    ///     audio: None,
    ///     ..Default::default()
    /// };
    /// assert_eq!(build.status(), PageStatus::Failed);
    /// ```
    pub fn status(&self) -> PageStatus {
        let missing_audio = self.audio_requested && self.audio.is_none();
        let nothing_produced = (self.audio_requested || self.image_requested)
            && self.audio.is_none()
            && self.image.is_none();
        if missing_audio || nothing_produced {
            PageStatus::Failed
        } else {
            PageStatus::Completed
        }
    }
}

/// Builds the audio and illustration for a page.
#[derive(Clone)]
pub struct PageBuilder {
    speech: Arc<dyn SpeechSynthesizer>,
    images: Arc<dyn ImageGenerator>,
    mixer: Arc<dyn AudioMixer>,
    storage: Arc<dyn AssetStorage>,
}

impl std::fmt::Debug for PageBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuilder").finish_non_exhaustive()
    }
}

impl PageBuilder {
    /// Create a builder over the given collaborators.
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        images: Arc<dyn ImageGenerator>,
        mixer: Arc<dyn AudioMixer>,
        storage: Arc<dyn AssetStorage>,
    ) -> Self {
        Self {
            speech,
            images,
            mixer,
            storage,
        }
    }

    /// Build every asset for `page`. Never fails.
    #[instrument(skip(self, ctx, page), fields(story_id = %ctx.story_id, page = page.page_number))]
    pub async fn build_page(&self, ctx: &PageContext, page: &Page) -> PageBuild {
        let audio_requested = ctx.options.audio && !page.timeline.is_empty();
        let image_prompt = page
            .image_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty());
        let image_requested = ctx.options.images && image_prompt.is_some();

        let audio_work = async {
            if audio_requested {
                self.build_audio(ctx, page).await
            } else {
                (None, Vec::new())
            }
        };
        let image_work = async {
            match image_prompt {
                Some(prompt) if image_requested => self.build_image(ctx, page, prompt).await,
                _ => (None, Vec::new()),
            }
        };
        let ((audio, audio_errors), (image, image_errors)) = tokio::join!(audio_work, image_work);

        let mut errors = audio_errors;
        errors.extend(image_errors);

        let build = PageBuild {
            audio,
            image,
            errors,
            audio_requested,
            image_requested,
        };
        info!(
            status = %build.status(),
            audio = build.audio.is_some(),
            image = build.image.is_some(),
            errors = build.errors.len(),
            "Page built"
        );
        build
    }

    /// Speak every beat in order, mix and store.
    async fn build_audio(
        &self,
        ctx: &PageContext,
        page: &Page,
    ) -> (Option<AssetRef>, Vec<PageError>) {
        let (segments, mut errors) = self.synthesize_timeline(ctx, page).await;
        if segments.is_empty() {
            warn!(page = page.page_number, "No audio segments produced");
            return (None, errors);
        }

        let clip = match self.mixer.mix(&segments).await {
            Ok(clip) => clip,
            Err(e) => {
                warn!(error = %e, "Mixing failed, using first segment");
                errors.push(PageError::new(ErrorStage::Mix, e.message()));
                segments[0].clip.clone()
            }
        };

        let asset = self
            .persist(&clip.bytes, MediaType::Audio, ctx, page.page_number)
            .await;
        match asset {
            Ok(asset) => (Some(asset), errors),
            Err(error) => {
                errors.push(error);
                (None, errors)
            }
        }
    }

    /// One segment per successful beat, in timeline order.
    async fn synthesize_timeline(
        &self,
        ctx: &PageContext,
        page: &Page,
    ) -> (Vec<AudioSegment>, Vec<PageError>) {
        let mut segments = Vec::new();
        let mut errors = Vec::new();

        for (index, beat) in page.timeline.iter().enumerate() {
            let (kind, stage, result) = match beat {
                Beat::Sfx {
                    description,
                    placeholder,
                } => {
                    let request = SoundEffectRequest {
                        description: description.clone(),
                        placeholder: placeholder.clone(),
                        duration_seconds: sfx_duration_hint(description),
                    };
                    (
                        SegmentKind::Sfx,
                        ErrorStage::Sfx,
                        self.speech.sound_effect(&request).await,
                    )
                }
                Beat::Narration { text, .. } | Beat::Character { text, .. } => {
                    if text.trim().is_empty() {
                        debug!(beat = index, "Skipping blank line");
                        continue;
                    }
                    let Some(profile) = ctx.voices.profile_for_beat(beat, &ctx.narrator) else {
                        continue;
                    };
                    let (kind, stage) = match beat {
                        Beat::Character { name, .. } => {
                            (SegmentKind::Character(name.clone()), ErrorStage::Character)
                        }
                        _ => (SegmentKind::Narration, ErrorStage::Narration),
                    };
                    let request =
                        SpeechRequest::new(text.clone(), profile.voice_id, profile.voice_settings);
                    (kind, stage, self.speech.synthesize(&request).await)
                }
            };

            match result {
                Ok(clip) => {
                    debug!(beat = index, kind = %kind, bytes = clip.bytes.len(), "Beat synthesized");
                    segments.push(AudioSegment {
                        beat_index: index,
                        kind,
                        clip,
                    });
                }
                Err(e) => {
                    warn!(beat = index, kind = %kind, error = %e, "Beat failed");
                    errors.push(PageError::new(stage, e.message()).at_beat(index));
                }
            }
        }

        (segments, errors)
    }

    async fn build_image(
        &self,
        ctx: &PageContext,
        page: &Page,
        prompt: &str,
    ) -> (Option<AssetRef>, Vec<PageError>) {
        let options = &ctx.options;
        let request = ImageRequest::builder()
            .prompt(prompt)
            .seed(options.seed)
            .art_style(options.art_style.clone())
            .aspect_ratio(options.aspect_ratio.clone())
            .width(options.width)
            .height(options.height)
            .page_number(page.page_number)
            .build();
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                return (None, vec![PageError::new(ErrorStage::Image, e.to_string())]);
            }
        };

        let illustration = match self.images.generate_image(&request).await {
            Ok(illustration) => illustration,
            Err(e) => {
                warn!(error = %e, "Illustration failed");
                return (None, vec![PageError::new(ErrorStage::Image, e.message())]);
            }
        };

        match self
            .persist(&illustration.bytes, MediaType::Image, ctx, page.page_number)
            .await
        {
            Ok(asset) => (Some(asset), Vec::new()),
            Err(error) => (None, vec![error]),
        }
    }

    async fn persist(
        &self,
        bytes: &[u8],
        media: MediaType,
        ctx: &PageContext,
        page_number: u32,
    ) -> Result<AssetRef, PageError> {
        let directory = format!("{}/{}", media.directory(), ctx.story_id);
        let file_name = format!("page-{}.{}", page_number, media.extension());
        self.storage
            .store(bytes, &directory, &file_name)
            .await
            .map(AssetRef::from)
            .map_err(|e| {
                warn!(error = %e, %media, "Storing asset failed");
                PageError::new(ErrorStage::Storage, e.message())
            })
    }
}
