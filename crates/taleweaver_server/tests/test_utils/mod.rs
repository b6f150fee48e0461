//! A live server over stub providers.
//!
//! [`TestServer`] runs the real router on an ephemeral port. Providers are
//! in-process stubs, storage is a temp directory.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taleweaver_core::{Beat, Page, ParsedStory, Story, StoryOptions};
use taleweaver_error::{ProviderError, ProviderErrorKind, TaleweaverResult};
use taleweaver_interface::{
    AudioClip, Illustration, ImageGenerator, ImageRequest, SoundEffectRequest, SpeechRequest,
    SpeechSynthesizer, StoryGenerator, VoiceSample, VoiceSummary,
};
use taleweaver_pipeline::{InMemoryStoryStore, StoryPipeline};
use taleweaver_rate_limit::FeatureFlags;
use taleweaver_server::{AppState, router};
use taleweaver_storage::FileSystemStorage;
use taleweaver_voice::VoiceResolver;
use tempfile::TempDir;

fn upstream_error(status_code: u16, body: &str) -> taleweaver_error::TaleweaverError {
    ProviderError::new(ProviderErrorKind::Http {
        provider: "stub".to_string(),
        status_code,
        body: body.to_string(),
    })
    .into()
}

/// Two pages about Mia and her robot.
pub fn robot_story() -> Story {
    Story {
        title: "Mia's Robot".to_string(),
        logline: "A girl builds a friend".to_string(),
        characters: vec![],
        pages: vec![
            Page::new(
                1,
                "The Workshop",
                Some("A cluttered workshop at night".to_string()),
                vec![
                    Beat::narration("Mia tightened the last bolt."),
                    Beat::character("Mia", "Wake up, Bolt!"),
                ],
            ),
            Page::new(
                2,
                "First Steps",
                Some("A small robot taking a step".to_string()),
                vec![
                    Beat::narration("Bolt blinked twice."),
                    Beat::character("Bolt", "Hello, Mia."),
                ],
            ),
        ],
        metadata: None,
    }
}

/// Returns [`robot_story`], or fails with the scripted status.
#[derive(Default)]
pub struct StubGenerator {
    pub fail_status: Option<u16>,
    pub calls: AtomicUsize,
    pub last_options: Mutex<Option<StoryOptions>>,
}

impl StubGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<StoryOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryGenerator for StubGenerator {
    async fn generate_story(&self, options: &StoryOptions) -> TaleweaverResult<ParsedStory> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());
        if let Some(status) = self.fail_status {
            return Err(upstream_error(status, "generator unavailable"));
        }
        Ok(ParsedStory {
            story: robot_story(),
            warnings: vec![],
        })
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// Speech stub: audio bytes are the spoken text in brackets.
#[derive(Default)]
pub struct StubSpeech {
    pub timeout: bool,
    pub requests: Mutex<Vec<SpeechRequest>>,
}

impl StubSpeech {
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> TaleweaverResult<AudioClip> {
        self.requests.lock().unwrap().push(request.clone());
        if self.timeout {
            return Err(ProviderError::new(ProviderErrorKind::Timeout {
                provider: "stub".to_string(),
                seconds: 60,
            })
            .into());
        }
        Ok(AudioClip::mp3(format!("[{}]", request.text).into_bytes()))
    }

    async fn sound_effect(&self, request: &SoundEffectRequest) -> TaleweaverResult<AudioClip> {
        Ok(AudioClip::mp3(format!("<{}>", request.description).into_bytes()))
    }

    async fn clone_voice(&self, _sample: &VoiceSample) -> TaleweaverResult<String> {
        Ok("cloned-voice".to_string())
    }

    async fn list_voices(&self) -> TaleweaverResult<Vec<VoiceSummary>> {
        Ok(vec![VoiceSummary {
            voice_id: "stub-voice".to_string(),
            name: "Stub".to_string(),
            category: Some("premade".to_string()),
            labels: Default::default(),
            preview_url: None,
        }])
    }
}

/// Image stub: always the same PNG-ish bytes.
#[derive(Default)]
pub struct StubImages {
    pub fail: bool,
}

#[async_trait]
impl ImageGenerator for StubImages {
    async fn generate_image(&self, request: &ImageRequest) -> TaleweaverResult<Illustration> {
        if self.fail {
            return Err(upstream_error(500, "images unavailable"));
        }
        Ok(Illustration {
            bytes: b"\x89PNG stub".to_vec(),
            content_type: "image/png".to_string(),
            seed: *request.seed(),
            request_id: Some("stub-request".to_string()),
        })
    }
}

/// The router on a local port.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub generator: Arc<StubGenerator>,
    pub speech: Arc<StubSpeech>,
    pub root: TempDir,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with(
            StubGenerator::default(),
            StubSpeech::default(),
            StubImages::default(),
            FeatureFlags::default(),
        )
        .await
    }

    pub async fn with(
        generator: StubGenerator,
        speech: StubSpeech,
        images: StubImages,
        features: FeatureFlags,
    ) -> Self {
        let root = TempDir::new().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let addr = listener.local_addr().expect("test server address");
        let base_url = format!("http://{}", addr);

        let storage = FileSystemStorage::new(root.path(), base_url.clone()).unwrap();
        let generator = Arc::new(generator);
        let speech = Arc::new(speech);
        let pipeline = StoryPipeline::builder()
            .generator(generator.clone())
            .speech(speech.clone())
            .images(Arc::new(images))
            .storage(Arc::new(storage))
            .store(Arc::new(InMemoryStoryStore::default()))
            .resolver(VoiceResolver::builtin().unwrap())
            .features(features)
            .build()
            .unwrap();
        let state = AppState::new(pipeline).with_body_limit(64 * 1024);

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            base_url,
            state,
            generator,
            speech,
            root,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Wait for every background build to finish.
    pub async fn settle(&self) {
        self.state.pipeline().runner().join_all().await;
    }
}

/// A valid story request body.
pub fn story_body() -> Value {
    serde_json::json!({
        "theme": "friendship",
        "genre": "science fiction",
        "targetAgeGroup": "5-7",
        "storyLength": 2,
        "mainCharacter": "Mia|female|clever, stubborn",
        "supportingCharacters": [{"name": "Bolt", "gender": "non-binary", "traits": "loyal, curious"}]
    })
}

/// Response body as JSON.
pub async fn json(response: reqwest::Response) -> Value {
    response.json().await.expect("JSON body")
}
