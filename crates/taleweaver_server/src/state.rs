//! Shared handler state.

use std::sync::Arc;
use taleweaver_error::TaleweaverResult;
use taleweaver_models::{ElevenLabsClient, OpenAiStoryClient, RunwareImageClient};
use taleweaver_pipeline::{InMemoryStoryStore, StoreLimits, StoryPipeline};
use taleweaver_rate_limit::TaleweaverConfig;
use taleweaver_storage::FileSystemStorage;
use taleweaver_voice::{VoiceCatalog, VoiceResolver};
use tracing::{info, instrument, warn};

/// Largest request body accepted when none is configured.
const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pipeline: StoryPipeline,
    body_limit: usize,
}

impl AppState {
    /// State over an already assembled pipeline.
    pub fn new(pipeline: StoryPipeline) -> Self {
        Self {
            pipeline,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Override the request body limit.
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Wire the real providers, storage and store from configuration.
    ///
    /// API keys come from the environment. A missing key is logged here and
    /// reported by the calls that need it.
    ///
    /// # Errors
    ///
    /// Fails when the voice catalog, storage root or an HTTP client cannot
    /// be set up.
    #[instrument(skip_all, fields(storage = %config.storage.root.display()))]
    pub fn from_config(config: &TaleweaverConfig) -> TaleweaverResult<Self> {
        let catalog = match &config.voices.catalog_path {
            Some(path) => VoiceCatalog::from_file(path)?,
            None => VoiceCatalog::builtin()?,
        };
        let catalog = Arc::new(catalog);

        let generator = OpenAiStoryClient::new(&config.providers.openai, catalog.clone())?;
        if !generator.has_api_key() {
            warn!("OPENAI_API_KEY is not set, story generation will fail");
        }
        let speech = ElevenLabsClient::new(&config.providers.elevenlabs)?;
        let images = RunwareImageClient::new(&config.providers.runware)?;

        let storage = FileSystemStorage::new(
            config.storage.root.clone(),
            config.server.public_base_url.clone(),
        )?;
        let store = InMemoryStoryStore::new(StoreLimits {
            max_jobs: config.pipeline.max_jobs,
            job_ttl: config.pipeline.job_ttl(),
        });

        let pipeline = StoryPipeline::builder()
            .generator(Arc::new(generator))
            .speech(Arc::new(speech))
            .images(Arc::new(images))
            .storage(Arc::new(storage))
            .store(Arc::new(store))
            .resolver(VoiceResolver::new(catalog))
            .config(config.pipeline.clone())
            .features(config.features)
            .build()?;

        info!(features = ?config.features, "Assembled story pipeline");
        Ok(Self::new(pipeline).with_body_limit(config.server.body_limit_bytes))
    }

    /// The story pipeline.
    pub fn pipeline(&self) -> &StoryPipeline {
        &self.pipeline
    }

    /// Request body limit in bytes.
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }
}
