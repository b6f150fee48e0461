//! Story build orchestration.

use crate::tasks::panic_message;
use crate::{
    BuildRequest, ConcatMixer, NarratorChoice, PageBuild, PageBuildOptions, PageBuilder,
    PageContext, TaskRunner,
};
use futures::{FutureExt, StreamExt, stream};
use rand::Rng;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use taleweaver_core::{
    ErrorStage, Page, PageError, PagePatch, PageStatus, Story, StoryOptions, VoiceProfile,
};
use taleweaver_error::{BuilderError, PipelineError, PipelineErrorKind, TaleweaverResult};
use taleweaver_interface::{
    AudioMixer, ImageGenerator, SpeechSynthesizer, StoryGenerator, StoryStateStore,
};
use taleweaver_rate_limit::{FeatureFlags, PipelineConfig};
use taleweaver_storage::AssetStorage;
use taleweaver_voice::{VoiceCache, VoiceResolver};
use tracing::{error, info, instrument, warn};

/// Upper bound (exclusive) for story-wide image seeds.
const SEED_RANGE: u64 = 10_000_000;

/// Orchestrates story generation and the per-page asset builds.
///
/// Every collaborator is injected, so the same pipeline runs against the
/// real providers in the server and against scripted doubles in tests.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = StoryPipeline::builder()
///     .generator(Arc::new(openai))
///     .speech(Arc::new(elevenlabs))
///     .images(Arc::new(runware))
///     .storage(Arc::new(storage))
///     .store(Arc::new(InMemoryStoryStore::default()))
///     .resolver(VoiceResolver::builtin()?)
///     .build()?;
///
/// let ticket = pipeline.start_build(BuildRequest::new(options)).await?;
/// ```
#[derive(Clone, derive_getters::Getters, derive_builder::Builder)]
#[builder(pattern = "owned", build_fn(private, name = "build_internal"))]
pub struct StoryPipeline {
    /// Story text generation
    generator: Arc<dyn StoryGenerator>,
    /// Speech, sound effects and voice cloning
    speech: Arc<dyn SpeechSynthesizer>,
    /// Illustrations
    images: Arc<dyn ImageGenerator>,
    /// Page audio mixing
    #[builder(default = "Arc::new(ConcatMixer::new()) as Arc<dyn AudioMixer>")]
    mixer: Arc<dyn AudioMixer>,
    /// Public asset storage
    storage: Arc<dyn AssetStorage>,
    /// Job state
    store: Arc<dyn StoryStateStore>,
    /// Voice lookups
    resolver: VoiceResolver,
    /// Build tuning
    #[builder(default)]
    config: PipelineConfig,
    /// Optional surfaces
    #[builder(default)]
    features: FeatureFlags,
    /// Background page loops
    #[builder(default)]
    runner: TaskRunner,
}

impl StoryPipelineBuilder {
    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns error if a collaborator is unset.
    pub fn build(self) -> Result<StoryPipeline, BuilderError> {
        self.build_internal()
            .map_err(|e| BuilderError::from(e.to_string()))
    }
}

impl std::fmt::Debug for StoryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryPipeline")
            .field("generator", &self.generator.provider_name())
            .field("config", &self.config)
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

/// Returned to the client as soon as the job exists.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildTicket {
    /// Job id to poll
    pub story_id: String,
    /// The generated story
    pub story: Story,
}

/// Final tally of a page loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Pages that finished completed
    pub completed: usize,
    /// Pages that finished failed
    pub failed: usize,
}

/// Story, narrator and page settings resolved for one build.
#[derive(Debug, Clone)]
pub(crate) struct BuildPlan {
    pub story: Story,
    pub narrator: VoiceProfile,
    pub voices: Arc<VoiceCache>,
    pub options: PageBuildOptions,
}

impl StoryPipeline {
    /// Creates a new builder.
    pub fn builder() -> StoryPipelineBuilder {
        StoryPipelineBuilder::default()
    }

    /// Page builder over this pipeline's collaborators.
    pub fn page_builder(&self) -> PageBuilder {
        PageBuilder::new(
            Arc::clone(&self.speech),
            Arc::clone(&self.images),
            Arc::clone(&self.mixer),
            Arc::clone(&self.storage),
        )
    }

    /// Fail with [`PipelineErrorKind::FeatureDisabled`] unless `enabled`.
    pub(crate) fn require(&self, enabled: bool, feature: &str) -> TaleweaverResult<()> {
        if enabled {
            Ok(())
        } else {
            Err(PipelineError::new(PipelineErrorKind::FeatureDisabled(feature.to_string())).into())
        }
    }

    /// A fresh story-wide image seed.
    pub(crate) fn new_seed() -> u64 {
        rand::thread_rng().gen_range(0..SEED_RANGE)
    }

    /// Validate, generate and merge the requested cast.
    pub(crate) async fn generate(
        &self,
        options: &StoryOptions,
        narrator: &NarratorChoice,
    ) -> TaleweaverResult<Story> {
        options.validate()?;
        let suggested = narrator.suggested_id(&self.resolver);
        let parsed = self
            .generator
            .generate_story(&options.with_narration_voice_id(suggested))
            .await?;
        for (page, warning) in &parsed.warnings {
            warn!(page, %warning, "Timeline warning");
        }
        Ok(parsed.story.with_cast(options.cast()))
    }

    /// Resolve everything a build needs before pages start.
    pub(crate) async fn plan(&self, request: &BuildRequest) -> TaleweaverResult<BuildPlan> {
        let story = self.generate(&request.options, &request.narrator).await?;

        let audio = self.features.audio && request.create_audio;
        let images = self.features.images && request.create_images;

        let narrator = if audio {
            request
                .narrator
                .resolve(&self.resolver, self.speech.as_ref())
                .await?
        } else {
            request.narrator.preview(&self.resolver)
        };
        let voices = Arc::new(VoiceCache::for_story(&story, &self.resolver));

        let art_style = request
            .art_style
            .clone()
            .or_else(|| request.options.art_style().clone())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.config.art_style.clone());
        let aspect_ratio = request
            .aspect_ratio
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.config.aspect_ratio.clone());

        Ok(BuildPlan {
            story,
            narrator,
            voices,
            options: PageBuildOptions {
                audio,
                images,
                art_style,
                aspect_ratio,
                width: Some(self.config.image_width),
                height: Some(self.config.image_height),
                seed: Some(Self::new_seed()),
            },
        })
    }

    /// Generate the story and create its job without starting the pages.
    ///
    /// # Errors
    ///
    /// Validation, generation, voice cloning and store failures.
    #[instrument(skip(self, request), fields(theme = %request.options.theme(), length = request.options.story_length()))]
    pub async fn prepare_build(&self, request: BuildRequest) -> TaleweaverResult<PreparedBuild> {
        let plan = self.plan(&request).await?;
        let story_id = self.store.create(plan.story.clone()).await?;
        info!(
            story_id = %story_id,
            pages = plan.story.pages.len(),
            narrator = %plan.narrator.voice_id,
            voices = plan.voices.len(),
            "Prepared story build"
        );

        Ok(PreparedBuild {
            context: PageContext {
                story_id: story_id.clone(),
                narrator: plan.narrator,
                voices: plan.voices,
                options: plan.options,
            },
            story_id,
            story: plan.story,
            builder: self.page_builder(),
            store: Arc::clone(&self.store),
            concurrency: self.config.page_concurrency.max(1),
        })
    }

    /// Generate the story, create its job and build pages in the background.
    ///
    /// Returns as soon as the job exists; every page is still pending.
    ///
    /// # Errors
    ///
    /// As [`StoryPipeline::prepare_build`]. Page failures never surface here.
    pub async fn start_build(&self, request: BuildRequest) -> TaleweaverResult<BuildTicket> {
        let prepared = self.prepare_build(request).await?;
        let ticket = prepared.ticket();
        self.runner
            .spawn(format!("story-{}", ticket.story_id), async move {
                prepared.run().await;
                Ok(())
            })
            .await;
        Ok(ticket)
    }
}

/// A created job whose pages have not started.
pub struct PreparedBuild {
    story_id: String,
    story: Story,
    context: PageContext,
    builder: PageBuilder,
    store: Arc<dyn StoryStateStore>,
    concurrency: usize,
}

impl std::fmt::Debug for PreparedBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedBuild")
            .field("story_id", &self.story_id)
            .field("pages", &self.story.pages.len())
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl PreparedBuild {
    /// Job id.
    pub fn story_id(&self) -> &str {
        &self.story_id
    }

    /// The generated story.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Settings shared by every page.
    pub fn context(&self) -> &PageContext {
        &self.context
    }

    /// Ticket for the client.
    pub fn ticket(&self) -> BuildTicket {
        BuildTicket {
            story_id: self.story_id.clone(),
            story: self.story.clone(),
        }
    }

    /// Build every page and record the results.
    ///
    /// Pages start in page order, at most `page_concurrency` at a time.
    /// Every page ends in a terminal status, whatever happens inside it.
    #[instrument(skip(self), fields(story_id = %self.story_id, pages = self.story.pages.len()))]
    pub async fn run(self) -> BuildSummary {
        info!(concurrency = self.concurrency, "Starting page loop");
        let this = &self;
        let statuses: Vec<PageStatus> = stream::iter(self.story.pages.clone())
            .map(|page: Page| async move { this.process_page(&page).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let completed = statuses
            .iter()
            .filter(|s| **s == PageStatus::Completed)
            .count();
        let summary = BuildSummary {
            completed,
            failed: statuses.len() - completed,
        };
        info!(completed = summary.completed, failed = summary.failed, "Story build finished");
        summary
    }

    async fn process_page(&self, page: &Page) -> PageStatus {
        let number = page.page_number;
        self.record(number, PagePatch::default().with_status(PageStatus::Processing))
            .await;
        self.log(number, format!("Page {} started", number)).await;

        let outcome = AssertUnwindSafe(self.builder.build_page(&self.context, page))
            .catch_unwind()
            .await;
        let (status, build) = match outcome {
            Ok(build) => (build.status(), build),
            Err(payload) => {
                let message = format!("Page builder panicked: {}", panic_message(payload.as_ref()));
                error!(page = number, %message, "Page build aborted");
                let build = PageBuild {
                    errors: vec![PageError::new(ErrorStage::Page, message)],
                    ..Default::default()
                };
                (PageStatus::Failed, build)
            }
        };

        for page_error in &build.errors {
            self.log(number, format!("{} error: {}", page_error.stage, page_error.message))
                .await;
        }
        let summary = match status {
            PageStatus::Completed => format!("Page {} completed", number),
            _ => format!("Page {} failed with {} error(s)", number, build.errors.len()),
        };
        self.log(number, summary).await;

        let patch = PagePatch {
            status: Some(status),
            audio: build.audio,
            image: build.image,
            errors: build.errors,
        };
        self.record(number, patch).await;
        status
    }

    async fn record(&self, page_number: u32, patch: PagePatch) {
        if let Err(e) = self.store.update_page(&self.story_id, page_number, patch).await {
            warn!(page = page_number, error = %e, "Page update rejected");
        }
    }

    async fn log(&self, page_number: u32, message: String) {
        if let Err(e) = self.store.append_log(&self.story_id, page_number, message).await {
            warn!(page = page_number, error = %e, "Page log rejected");
        }
    }
}
