//! Scripted collaborators for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taleweaver_core::{
    Beat, Character, Gender, Page, ParsedStory, Story, StoryOptions,
};
use taleweaver_error::{
    PipelineError, PipelineErrorKind, ProviderError, ProviderErrorKind, TaleweaverResult,
};
use taleweaver_interface::{
    AudioClip, AudioMixer, AudioSegment, Illustration, ImageGenerator, ImageRequest, SoundEffectRequest, SpeechRequest,
    SpeechSynthesizer, StoryGenerator, VoiceSample, VoiceSummary,
};
use taleweaver_pipeline::{ConcatMixer, InMemoryStoryStore, StoreLimits, StoryPipeline};
use taleweaver_rate_limit::{FeatureFlags, PipelineConfig};
use taleweaver_storage::FileSystemStorage;
use taleweaver_voice::VoiceResolver;
use tempfile::TempDir;
use tokio::sync::Semaphore;

fn upstream_error(message: &str) -> taleweaver_error::TaleweaverError {
    ProviderError::new(ProviderErrorKind::Http {
        provider: "mock".to_string(),
        status_code: 500,
        body: message.to_string(),
    })
    .into()
}

/// Two pages: Alex and Sam, with a sound effect on page 1.
pub fn two_page_story() -> Story {
    let mut alex_line = Beat::character("Alex", "Look at the lantern!");
    if let Beat::Character { emotion, .. } = &mut alex_line {
        *emotion = Some("curious".to_string());
    }
    Story {
        title: "The Lantern".to_string(),
        logline: "Adventure - Kids".to_string(),
        characters: vec![],
        pages: vec![
            Page::new(
                1,
                "Dusk",
                Some("A glowing lantern in a forest".to_string()),
                vec![
                    Beat::narration("Night fell over the forest."),
                    alex_line,
                    Beat::Sfx {
                        description: "An owl hoots".to_string(),
                        placeholder: Some("HOO!".to_string()),
                    },
                ],
            ),
            Page::new(
                2,
                "Dawn",
                Some("Sunrise over the hills".to_string()),
                vec![
                    Beat::narration("Morning came."),
                    Beat::character("Alex", "We made it."),
                    Beat::character("Sam", "Together."),
                ],
            ),
        ],
        metadata: None,
    }
}

/// Options for a two page story with Alex and Sam.
pub fn two_page_options() -> StoryOptions {
    StoryOptions::builder()
        .theme("friendship")
        .genre("adventure")
        .target_age_group("5-7")
        .story_length(2u32)
        .main_character(Some(
            Character::from_descriptor("Alex|male|brave, curious").unwrap(),
        ))
        .supporting_characters(vec![
            Character::from_descriptor("Sam|female|loyal, inventive").unwrap(),
        ])
        .build()
        .unwrap()
}

/// Returns a fixed story.
pub struct ScriptedGenerator {
    story: Story,
    fail: bool,
    calls: AtomicUsize,
    last_options: Mutex<Option<StoryOptions>>,
}

impl ScriptedGenerator {
    pub fn new(story: Story) -> Self {
        Self {
            story,
            fail: false,
            calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(two_page_story())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<StoryOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryGenerator for ScriptedGenerator {
    async fn generate_story(&self, options: &StoryOptions) -> TaleweaverResult<ParsedStory> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());
        if self.fail {
            return Err(upstream_error("generator down"));
        }
        Ok(ParsedStory {
            story: self.story.clone(),
            warnings: vec![],
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Speech double. Audio bytes are `ID3`-free text so mixes are readable.
#[derive(Default)]
pub struct MockSpeech {
    pub fail_sfx: bool,
    pub fail_speech: bool,
    pub clone_id: Option<String>,
    /// When set, every call waits for a permit
    pub gate: Option<Arc<Semaphore>>,
    pub speech_requests: Mutex<Vec<SpeechRequest>>,
    pub sfx_requests: Mutex<Vec<SoundEffectRequest>>,
    pub clone_requests: Mutex<Vec<VoiceSample>>,
}

impl MockSpeech {
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
    }

    pub fn speech_requests(&self) -> Vec<SpeechRequest> {
        self.speech_requests.lock().unwrap().clone()
    }

    pub fn sfx_requests(&self) -> Vec<SoundEffectRequest> {
        self.sfx_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> TaleweaverResult<AudioClip> {
        self.wait().await;
        self.speech_requests.lock().unwrap().push(request.clone());
        if self.fail_speech {
            return Err(upstream_error("speech down"));
        }
        Ok(AudioClip::mp3(format!("[{}]", request.text).into_bytes()))
    }

    async fn sound_effect(&self, request: &SoundEffectRequest) -> TaleweaverResult<AudioClip> {
        self.wait().await;
        self.sfx_requests.lock().unwrap().push(request.clone());
        if self.fail_sfx {
            return Err(upstream_error("sfx down"));
        }
        Ok(AudioClip::mp3(format!("<{}>", request.description).into_bytes()))
    }

    async fn clone_voice(&self, sample: &VoiceSample) -> TaleweaverResult<String> {
        self.clone_requests.lock().unwrap().push(sample.clone());
        Ok(self.clone_id.clone().unwrap_or_default())
    }

    async fn list_voices(&self) -> TaleweaverResult<Vec<VoiceSummary>> {
        Ok(vec![VoiceSummary {
            voice_id: "voice-1".to_string(),
            name: "Mock".to_string(),
            category: None,
            labels: Default::default(),
            preview_url: None,
        }])
    }
}

/// Image double.
#[derive(Default)]
pub struct MockImages {
    pub fail: bool,
    pub panic: bool,
    pub requests: Mutex<Vec<ImageRequest>>,
}

impl MockImages {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockImages {
    async fn generate_image(&self, request: &ImageRequest) -> TaleweaverResult<Illustration> {
        self.requests.lock().unwrap().push(request.clone());
        if self.panic {
            panic!("image provider exploded");
        }
        if self.fail {
            return Err(upstream_error("images down"));
        }
        Ok(Illustration {
            bytes: b"\x89PNG fake".to_vec(),
            content_type: "image/png".to_string(),
            seed: *request.seed(),
            request_id: Some("req-1".to_string()),
        })
    }
}

/// Mixer that never manages to combine segments.
#[derive(Default)]
pub struct BrokenMixer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl AudioMixer for BrokenMixer {
    async fn mix(&self, _segments: &[AudioSegment]) -> TaleweaverResult<AudioClip> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PipelineError::new(PipelineErrorKind::Mixing("codec mismatch".to_string())).into())
    }
}

/// A pipeline over scripted collaborators and a temp storage root.
pub struct Harness {
    pub pipeline: StoryPipeline,
    pub store: Arc<InMemoryStoryStore>,
    pub generator: Arc<ScriptedGenerator>,
    pub speech: Arc<MockSpeech>,
    pub images: Arc<MockImages>,
    pub root: TempDir,
}

impl Harness {
    pub fn new(speech: MockSpeech, images: MockImages) -> Self {
        Self::with(
            ScriptedGenerator::new(two_page_story()),
            speech,
            images,
            PipelineConfig::default(),
            FeatureFlags::default(),
        )
    }

    pub fn with_mixer(speech: MockSpeech, images: MockImages, mixer: Arc<dyn AudioMixer>) -> Self {
        Self::assemble(
            ScriptedGenerator::new(two_page_story()),
            speech,
            images,
            mixer,
            PipelineConfig::default(),
            FeatureFlags::default(),
        )
    }

    pub fn with(
        generator: ScriptedGenerator,
        speech: MockSpeech,
        images: MockImages,
        config: PipelineConfig,
        features: FeatureFlags,
    ) -> Self {
        Self::assemble(
            generator,
            speech,
            images,
            Arc::new(ConcatMixer::new()),
            config,
            features,
        )
    }

    fn assemble(
        generator: ScriptedGenerator,
        speech: MockSpeech,
        images: MockImages,
        mixer: Arc<dyn AudioMixer>,
        config: PipelineConfig,
        features: FeatureFlags,
    ) -> Self {
        let root = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(root.path(), "http://localhost:5000").unwrap();
        let store = Arc::new(InMemoryStoryStore::new(StoreLimits::default()));
        let generator = Arc::new(generator);
        let speech = Arc::new(speech);
        let images = Arc::new(images);

        let pipeline = StoryPipeline::builder()
            .generator(generator.clone())
            .speech(speech.clone())
            .images(images.clone())
            .mixer(mixer)
            .storage(Arc::new(storage))
            .store(store.clone())
            .resolver(VoiceResolver::builtin().unwrap())
            .config(config)
            .features(features)
            .build()
            .unwrap();

        Self {
            pipeline,
            store,
            generator,
            speech,
            images,
            root,
        }
    }

    /// Bytes of a stored asset by public path.
    pub fn read_asset(&self, public_path: &str) -> Vec<u8> {
        std::fs::read(self.root.path().join(public_path.trim_start_matches('/'))).unwrap()
    }
}
