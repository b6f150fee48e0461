//! One-shot operations answered in the request: text-only generation,
//! direct narration and illustration, batch page assets and the bundle.

use crate::{BuildRequest, PageContext, StoryPipeline};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use taleweaver_core::{
    Beat, Page, PageError, Story, StoryOptions, StorySummary, VoiceSettings,
};
use taleweaver_error::{TaleweaverResult, ValidationError};
use taleweaver_interface::{ImageRequest, SpeechRequest, VoiceSummary};
use taleweaver_storage::MediaType;
use taleweaver_voice::{CatalogVoice, VoiceCategory};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Page description supplied by clients for batch operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageInput {
    /// Explicit page number; defaults to the position plus one
    pub page_number: Option<u32>,
    /// Illustration prompt
    pub image_prompt: Option<String>,
    /// Timeline
    pub timeline: Vec<Beat>,
}

impl PageInput {
    fn number(&self, index: usize) -> u32 {
        self.page_number.unwrap_or(index as u32 + 1)
    }

    fn prompt(&self) -> Option<&str> {
        self.image_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Directly synthesized speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narration {
    /// Encoded audio, base64
    pub audio_base64: String,
    /// MIME type
    pub content_type: String,
    /// Voice that spoke it
    pub voice_id: String,
}

/// A single illustration request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IllustrateRequest {
    /// Scene description
    pub prompt: String,
    /// Page the image is for
    pub page_number: Option<u32>,
    /// Style override
    pub art_style: Option<String>,
    /// Aspect ratio override
    pub aspect_ratio: Option<String>,
    /// Seed; random when unset
    pub seed: Option<u64>,
}

/// Provider details of a generated illustration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IllustrationMeta {
    /// Seed used
    pub seed: Option<u64>,
    /// Provider request id
    pub request_id: Option<String>,
    /// Style used
    pub art_style: String,
    /// Aspect ratio used
    pub aspect_ratio: String,
    /// MIME type
    pub content_type: String,
}

/// A generated illustration returned inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IllustrationResult {
    /// Page the image is for
    pub page_number: Option<u32>,
    /// Prompt used
    pub prompt: String,
    /// Encoded image, base64
    pub image_base64: String,
    /// Provider details
    pub meta: IllustrationMeta,
}

/// One page of a batch illustration run. Failures leave both fields unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// Page number
    pub page: u32,
    /// Public path
    pub image: Option<String>,
    /// Absolute URL
    pub image_url: Option<String>,
}

/// One page of a batch narration run. Failures leave both fields unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarratedPage {
    /// Page number
    pub page: u32,
    /// Public path
    pub audio: Option<String>,
    /// Absolute URL
    pub audio_url: Option<String>,
}

/// One page of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlePage {
    /// Page number
    pub page: u32,
    /// Illustration path
    pub image: Option<String>,
    /// Illustration URL
    pub image_url: Option<String>,
    /// Page audio path
    pub audio: Option<String>,
    /// Page audio URL
    pub audio_url: Option<String>,
    /// Markdown rendering of the timeline
    pub text_md: String,
    /// Timeline
    pub timeline: Vec<Beat>,
    /// Partial failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<PageError>,
}

/// A story built synchronously with every asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Directory key used for the assets
    pub story_id: String,
    /// Title, logline and cast
    pub story: StorySummary,
    /// Pages in page order
    pub pages: Vec<BundlePage>,
}

fn require_pages(pages: &[PageInput]) -> TaleweaverResult<()> {
    if pages.is_empty() {
        Err(ValidationError::new("pages array is required."))?
    }
    Ok(())
}

impl StoryPipeline {
    /// Generate a story without building any assets.
    ///
    /// # Errors
    ///
    /// Validation and generation failures.
    #[instrument(skip(self, options), fields(theme = %options.theme()))]
    pub async fn generate_story(&self, options: &StoryOptions) -> TaleweaverResult<Story> {
        let narrator = crate::NarratorChoice {
            tone: options.narration_tone().clone(),
            ..Default::default()
        };
        let story = self.generate(options, &narrator).await?;
        info!(title = %story.title, pages = story.pages.len(), "Generated story");
        Ok(story)
    }

    /// Speak `text` with a narrator voice.
    ///
    /// # Errors
    ///
    /// Validation error for blank text, feature and provider failures.
    #[instrument(skip(self, text, settings), fields(chars = text.len()))]
    pub async fn narrate(
        &self,
        text: &str,
        voice_id: Option<&str>,
        settings: Option<VoiceSettings>,
    ) -> TaleweaverResult<Narration> {
        self.require(self.features().speech_endpoints, "speech endpoints")?;
        self.require(self.features().audio, "audio")?;
        if text.trim().is_empty() {
            Err(ValidationError::new("Text is required for narration."))?
        }

        let voice_id = self.resolver().resolve_id(voice_id, VoiceCategory::Narrator);
        let request = SpeechRequest::new(
            text.trim(),
            voice_id.clone(),
            settings.unwrap_or(VoiceSettings::narration_fallback()),
        );
        let clip = self.speech().synthesize(&request).await?;
        debug!(bytes = clip.bytes.len(), "Narrated text");
        Ok(Narration {
            audio_base64: STANDARD.encode(&clip.bytes),
            content_type: clip.content_type,
            voice_id,
        })
    }

    /// Generate one illustration and return it inline.
    ///
    /// # Errors
    ///
    /// Validation error for a blank prompt, feature and provider failures.
    #[instrument(skip(self, request), fields(page = ?request.page_number))]
    pub async fn illustrate(&self, request: IllustrateRequest) -> TaleweaverResult<IllustrationResult> {
        self.require(self.features().images, "images")?;
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            Err(ValidationError::new(
                "Prompt is required to generate an illustration.",
            ))?
        }

        let art_style = request
            .art_style
            .unwrap_or_else(|| self.config().art_style.clone());
        let aspect_ratio = request
            .aspect_ratio
            .unwrap_or_else(|| self.config().aspect_ratio.clone());
        let image_request = ImageRequest::builder()
            .prompt(prompt)
            .seed(request.seed.unwrap_or_else(Self::new_seed))
            .art_style(art_style.clone())
            .aspect_ratio(aspect_ratio.clone())
            .width(self.config().image_width)
            .height(self.config().image_height)
            .page_number(request.page_number)
            .build()?;

        let illustration = self.images().generate_image(&image_request).await?;
        Ok(IllustrationResult {
            page_number: request.page_number,
            prompt: prompt.to_string(),
            image_base64: STANDARD.encode(&illustration.bytes),
            meta: IllustrationMeta {
                seed: illustration.seed.or(*image_request.seed()),
                request_id: illustration.request_id,
                art_style,
                aspect_ratio,
                content_type: illustration.content_type,
            },
        })
    }

    /// Illustrate a batch of pages with one shared seed.
    ///
    /// Pages without a prompt, and pages whose generation or storage fails,
    /// come back with no image. Results keep the input order.
    ///
    /// # Errors
    ///
    /// Validation error for an empty batch; feature failures.
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub async fn generate_images(
        &self,
        pages: &[PageInput],
        art_style: Option<&str>,
        aspect_ratio: Option<&str>,
    ) -> TaleweaverResult<Vec<GeneratedImage>> {
        self.require(self.features().images, "images")?;
        require_pages(pages)?;

        let batch = Uuid::new_v4().to_string();
        let directory = format!("{}/{}", MediaType::Image.directory(), batch);
        let seed = Self::new_seed();
        let art_style = art_style
            .map(str::to_string)
            .unwrap_or_else(|| self.config().art_style.clone());
        let aspect_ratio = aspect_ratio
            .map(str::to_string)
            .unwrap_or_else(|| self.config().aspect_ratio.clone());

        let results = stream::iter(pages.iter().cloned().enumerate())
            .map(|(index, input): (usize, PageInput)| {
                let number = input.number(index);
                let directory = &directory;
                let art_style = &art_style;
                let aspect_ratio = &aspect_ratio;
                async move {
                    let empty = GeneratedImage {
                        page: number,
                        image: None,
                        image_url: None,
                    };
                    let Some(prompt) = input.prompt() else {
                        debug!(page = number, "No image prompt");
                        return empty;
                    };
                    let request = match ImageRequest::builder()
                        .prompt(prompt)
                        .seed(seed)
                        .art_style(art_style.clone())
                        .aspect_ratio(aspect_ratio.clone())
                        .width(self.config().image_width)
                        .height(self.config().image_height)
                        .page_number(number)
                        .build()
                    {
                        Ok(request) => request,
                        Err(e) => {
                            warn!(page = number, error = %e, "Invalid image request");
                            return empty;
                        }
                    };
                    let file_name = format!("page-{}.{}", number, MediaType::Image.extension());
                    let stored = match self.images().generate_image(&request).await {
                        Ok(illustration) => {
                            self.storage()
                                .store(&illustration.bytes, directory, &file_name)
                                .await
                        }
                        Err(e) => Err(e),
                    };
                    match stored {
                        Ok(asset) => GeneratedImage {
                            page: number,
                            image: Some(asset.path),
                            image_url: Some(asset.url),
                        },
                        Err(e) => {
                            warn!(page = number, error = %e, "Page illustration failed");
                            empty
                        }
                    }
                }
            })
            .buffered(self.config().page_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        info!(
            batch = %batch,
            generated = results.iter().filter(|r| r.image.is_some()).count(),
            "Generated page images"
        );
        Ok(results)
    }

    /// Narrate the narration lines of each page with one voice.
    ///
    /// The alias wins over the id; with neither the default narrator is
    /// used. Pages with no narration text, and pages whose synthesis or
    /// storage fails, come back with no audio.
    ///
    /// # Errors
    ///
    /// Validation error for an empty batch; feature failures.
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub async fn narrate_pages(
        &self,
        pages: &[PageInput],
        voice_id: Option<&str>,
        voice_alias: Option<&str>,
    ) -> TaleweaverResult<Vec<NarratedPage>> {
        self.require(self.features().speech_endpoints, "speech endpoints")?;
        self.require(self.features().audio, "audio")?;
        require_pages(pages)?;

        let requested = voice_alias
            .filter(|a| !a.trim().is_empty())
            .or(voice_id);
        let voice = self.resolver().resolve_id(requested, VoiceCategory::Narrator);
        let batch = Uuid::new_v4().to_string();
        let directory = format!("{}/{}", MediaType::Audio.directory(), batch);

        let results = stream::iter(pages.iter().cloned().enumerate())
            .map(|(index, input): (usize, PageInput)| {
                let number = input.number(index);
                let page = Page::new(number, "", None, input.timeline.clone());
                let voice = &voice;
                let directory = &directory;
                async move {
                    let empty = NarratedPage {
                        page: number,
                        audio: None,
                        audio_url: None,
                    };
                    let text = page.narration_text();
                    if text.trim().is_empty() {
                        debug!(page = number, "No narration text");
                        return empty;
                    }
                    let settings = page
                        .narration_settings()
                        .unwrap_or(VoiceSettings::narration_fallback());
                    let request = SpeechRequest::new(text, voice.clone(), settings);
                    let file_name = format!("page-{}.{}", number, MediaType::Audio.extension());
                    let stored = match self.speech().synthesize(&request).await {
                        Ok(clip) => self.storage().store(&clip.bytes, directory, &file_name).await,
                        Err(e) => Err(e),
                    };
                    match stored {
                        Ok(asset) => NarratedPage {
                            page: number,
                            audio: Some(asset.path),
                            audio_url: Some(asset.url),
                        },
                        Err(e) => {
                            warn!(page = number, error = %e, "Page narration failed");
                            empty
                        }
                    }
                }
            })
            .buffered(self.config().page_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        info!(
            batch = %batch,
            voice_id = %voice,
            narrated = results.iter().filter(|r| r.audio.is_some()).count(),
            "Narrated pages"
        );
        Ok(results)
    }

    /// Generate a story and build every page before answering.
    ///
    /// No job is created; assets are stored under a fresh id. Page
    /// failures are reported per page.
    ///
    /// # Errors
    ///
    /// Feature, validation, generation and voice cloning failures.
    #[instrument(skip(self, request), fields(theme = %request.options.theme()))]
    pub async fn bundle(&self, request: BuildRequest) -> TaleweaverResult<Bundle> {
        self.require(self.features().bundle, "bundle")?;
        let plan = self.plan(&request).await?;
        let story_id = Uuid::new_v4().to_string();
        let context = PageContext {
            story_id: story_id.clone(),
            narrator: plan.narrator,
            voices: plan.voices,
            options: plan.options,
        };
        let builder = self.page_builder();

        let pages = stream::iter(plan.story.pages.clone())
            .map(|page: Page| {
                let builder = &builder;
                let context = &context;
                async move {
                    let build = builder.build_page(context, &page).await;
                    let (audio, audio_url) = match build.audio {
                        Some(asset) => (Some(asset.path), Some(asset.url)),
                        None => (None, None),
                    };
                    let (image, image_url) = match build.image {
                        Some(asset) => (Some(asset.path), Some(asset.url)),
                        None => (None, None),
                    };
                    BundlePage {
                        page: page.page_number,
                        image,
                        image_url,
                        audio,
                        audio_url,
                        text_md: page.markdown(),
                        timeline: page.timeline.clone(),
                        errors: build.errors,
                    }
                }
            })
            .buffered(self.config().page_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        info!(story_id = %story_id, pages = pages.len(), "Built story bundle");
        Ok(Bundle {
            story_id,
            story: plan.story.summary(),
            pages,
        })
    }

    /// Voices available from the speech provider.
    ///
    /// # Errors
    ///
    /// Feature and provider failures.
    pub async fn list_voices(&self) -> TaleweaverResult<Vec<VoiceSummary>> {
        self.require(self.features().speech_endpoints, "speech endpoints")?;
        self.speech().list_voices().await
    }

    /// Narrator choices from the voice catalog.
    pub fn narrator_voices(&self) -> Vec<CatalogVoice> {
        self.resolver().catalog().narrators()
    }
}
