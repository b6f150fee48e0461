//! ElevenLabs client.

use crate::elevenlabs::{
    AddVoiceResponse, SoundGenerationRequest, TextToSpeechRequest, VoicesResponse,
};
use crate::http::{build_client, check_status, env_key, read_bytes, require_key, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use taleweaver_error::{ProviderError, ProviderErrorKind, TaleweaverResult, ValidationError};
use taleweaver_interface::{
    AudioClip, SoundEffectRequest, SpeechRequest, SpeechSynthesizer, VoiceSample, VoiceSummary,
};
use taleweaver_rate_limit::{ProviderConfig, RateLimiter};
use tracing::{debug, info, instrument};

const PROVIDER: &str = "elevenlabs";
const API_KEY_VAR: &str = "ELEVENLABS_API_KEY";
const OUTPUT_FORMAT: &str = "mp3_44100_128";
const SFX_MIN_SECONDS: f64 = 0.5;
const SFX_MAX_SECONDS: f64 = 22.0;
const SFX_PROMPT_INFLUENCE: f64 = 0.3;

fn sample_mime(format: &str) -> &'static str {
    match format.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "mp3" | "mpeg" => "audio/mpeg",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        "m4a" | "mp4" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

fn empty_audio() -> ProviderError {
    ProviderError::new(ProviderErrorKind::MalformedResponse(
        "ElevenLabs returned empty audio".to_string(),
    ))
}

/// Speech synthesizer backed by ElevenLabs.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    limiter: RateLimiter,
}

impl ElevenLabsClient {
    /// Creates a client from provider configuration and `ELEVENLABS_API_KEY`.
    #[instrument(skip_all, fields(base_url = %config.base_url, model = %config.model))]
    pub fn new(config: &ProviderConfig) -> TaleweaverResult<Self> {
        Ok(Self {
            client: build_client()?,
            api_key: env_key(API_KEY_VAR),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            limiter: RateLimiter::new(PROVIDER, config.limits()),
        })
    }

    /// Replace the API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    async fn post_audio<T: serde::Serialize + Sync>(
        &self,
        api_key: &str,
        url: &str,
        body: &T,
    ) -> TaleweaverResult<AudioClip> {
        let response = self
            .client
            .post(url)
            .header("xi-api-key", api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        let bytes = read_bytes(PROVIDER, response).await?;
        if bytes.is_empty() {
            return Err(empty_audio().into());
        }
        Ok(AudioClip::mp3(bytes))
    }

    async fn add_voice(&self, api_key: &str, sample: &VoiceSample) -> TaleweaverResult<String> {
        let file = Part::bytes(sample.bytes.clone())
            .file_name(format!("sample.{}", sample.format.trim_start_matches('.')))
            .mime_str(sample_mime(&sample.format))
            .map_err(|e| transport_error(PROVIDER, e))?;
        let form = Form::new().text("name", sample.name.clone()).part("files", file);

        let response = self
            .client
            .post(format!("{}/v1/voices/add", self.base_url))
            .header("xi-api-key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        let added: AddVoiceResponse = response.json().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::MalformedResponse(format!(
                "Failed to parse voice creation response: {}",
                e
            )))
        })?;
        Ok(added.voice_id)
    }

    async fn fetch_voices(&self, api_key: &str) -> TaleweaverResult<VoicesResponse> {
        let response = self
            .client
            .get(format!("{}/v2/voices", self.base_url))
            .query(&[("page_size", "100")])
            .header("xi-api-key", api_key)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        Ok(response.json::<VoicesResponse>().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::MalformedResponse(format!(
                "Failed to parse voice list: {}",
                e
            )))
        })?)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    #[instrument(skip(self, request), fields(voice_id = %request.voice_id, chars = request.text.len()))]
    async fn synthesize(&self, request: &SpeechRequest) -> TaleweaverResult<AudioClip> {
        let api_key = require_key(&self.api_key, API_KEY_VAR)?;
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url, request.voice_id, OUTPUT_FORMAT
        );
        let body = TextToSpeechRequest {
            text: request.text.clone(),
            model_id: self.model.clone(),
            voice_settings: request.voice_settings.into(),
        };

        let clip = self
            .limiter
            .execute(|| self.post_audio(api_key, &url, &body))
            .await?;
        debug!(size = clip.bytes.len(), "Synthesized speech");
        Ok(clip)
    }

    #[instrument(skip(self, request), fields(description = %request.description, duration = ?request.duration_seconds))]
    async fn sound_effect(&self, request: &SoundEffectRequest) -> TaleweaverResult<AudioClip> {
        let api_key = require_key(&self.api_key, API_KEY_VAR)?;
        let url = format!(
            "{}/v1/sound-generation?output_format={}",
            self.base_url, OUTPUT_FORMAT
        );
        let body = SoundGenerationRequest {
            text: request.description.clone(),
            duration_seconds: request
                .duration_seconds
                .map(|d| d.clamp(SFX_MIN_SECONDS, SFX_MAX_SECONDS)),
            prompt_influence: SFX_PROMPT_INFLUENCE,
        };

        let clip = self
            .limiter
            .execute(|| self.post_audio(api_key, &url, &body))
            .await?;
        debug!(size = clip.bytes.len(), "Generated sound effect");
        Ok(clip)
    }

    #[instrument(skip(self, sample), fields(name = %sample.name, format = %sample.format, size = sample.bytes.len()))]
    async fn clone_voice(&self, sample: &VoiceSample) -> TaleweaverResult<String> {
        let api_key = require_key(&self.api_key, API_KEY_VAR)?;
        if sample.bytes.is_empty() {
            return Err(ValidationError::new("Voice sample is empty").into());
        }

        let voice_id = self
            .limiter
            .execute(|| self.add_voice(api_key, sample))
            .await?;
        info!(voice_id = %voice_id, "Cloned voice");
        Ok(voice_id)
    }

    #[instrument(skip(self))]
    async fn list_voices(&self) -> TaleweaverResult<Vec<VoiceSummary>> {
        let api_key = require_key(&self.api_key, API_KEY_VAR)?;
        let listing = self.limiter.execute(|| self.fetch_voices(api_key)).await?;
        info!(
            voices = listing.voices.len(),
            total = ?listing.total_count,
            "Listed voices"
        );
        Ok(listing.voices.into_iter().map(VoiceSummary::from).collect())
    }
}
