//! OpenAI-compatible chat completions client.

use crate::http::{build_client, check_status, env_key, require_key, transport_error};
use crate::openai::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat, prompt};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use taleweaver_core::{ParsedStory, StoryOptions, parse_generated_story};
use taleweaver_error::{
    BuilderError, JsonError, ProviderError, ProviderErrorKind, TaleweaverResult,
};
use taleweaver_interface::StoryGenerator;
use taleweaver_rate_limit::{ProviderConfig, RateLimiter};
use taleweaver_voice::VoiceCatalog;
use tracing::{debug, info, instrument};

const PROVIDER: &str = "openai";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Story generator backed by a chat completions endpoint.
///
/// The key is read once at construction; a missing key only fails the
/// calls that need it, so the service can start without credentials.
#[derive(Debug, Clone)]
pub struct OpenAiStoryClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    catalog: Arc<VoiceCatalog>,
    limiter: RateLimiter,
}

impl OpenAiStoryClient {
    /// Creates a client from provider configuration and `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip_all, fields(base_url = %config.base_url, model = %config.model))]
    pub fn new(config: &ProviderConfig, catalog: Arc<VoiceCatalog>) -> TaleweaverResult<Self> {
        Ok(Self {
            client: build_client()?,
            api_key: env_key(API_KEY_VAR),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            catalog,
            limiter: RateLimiter::new(PROVIDER, config.limits()),
        })
    }

    /// Replace the API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Whether a key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, options: &StoryOptions) -> TaleweaverResult<ChatCompletionRequest> {
        let payload = prompt::user_payload(options).map_err(|e| JsonError::new(e.to_string()))?;
        let mut builder = ChatCompletionRequest::builder();
        builder
            .model(self.model.clone())
            .response_format(Some(ResponseFormat::json_object()))
            .messages(vec![
                ChatMessage::system(prompt::system_prompt(options, &self.catalog)),
                ChatMessage::user(payload),
            ]);
        if let Some(temperature) = self.temperature {
            builder.temperature(Some(temperature));
        }
        Ok(builder
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?)
    }

    async fn complete(&self, api_key: &str, body: &ChatCompletionRequest) -> TaleweaverResult<String> {
        let url = self.endpoint();
        debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::MalformedResponse(format!(
                "Failed to parse chat completion: {}",
                e
            )))
        })?;

        parsed.first_content().map(str::to_string).ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::MalformedResponse(
                "OpenAI returned an empty response.".to_string(),
            ))
            .into()
        })
    }
}

#[async_trait]
impl StoryGenerator for OpenAiStoryClient {
    #[instrument(skip(self, options), fields(model = %self.model, pages = *options.story_length()))]
    async fn generate_story(&self, options: &StoryOptions) -> TaleweaverResult<ParsedStory> {
        let api_key = require_key(&self.api_key, API_KEY_VAR)?;
        let body = self.build_request(options)?;

        let content = self
            .limiter
            .execute(|| self.complete(api_key, &body))
            .await?;
        debug!(chars = content.len(), "Received story content");

        let parsed = parse_generated_story(&content)?;
        info!(
            title = %parsed.story.title,
            pages = parsed.story.pages.len(),
            warnings = parsed.warnings.len(),
            "Generated story"
        );
        Ok(parsed)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
