//! Runware image client.

use crate::http::{build_client, check_status, env_key, require_key, transport_error};
use crate::runware::{RunwareInput, RunwareRequest, RunwareResponse};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use taleweaver_error::{BuilderError, ProviderError, ProviderErrorKind, TaleweaverResult};
use taleweaver_interface::{ImageGenerator, ImageRequest, Illustration};
use taleweaver_rate_limit::{ProviderConfig, RateLimiter};
use tracing::{debug, info, instrument};

const PROVIDER: &str = "runware";
const API_KEY_VAR: &str = "RUNWARE_API_KEY";

/// Image generator backed by Runware.
#[derive(Debug, Clone)]
pub struct RunwareImageClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    limiter: RateLimiter,
}

impl RunwareImageClient {
    /// Creates a client from provider configuration and `RUNWARE_API_KEY`.
    ///
    /// `base_url` is the full inference endpoint.
    #[instrument(skip_all, fields(endpoint = %config.base_url, model = %config.model))]
    pub fn new(config: &ProviderConfig) -> TaleweaverResult<Self> {
        Ok(Self {
            client: build_client()?,
            api_key: env_key(API_KEY_VAR),
            endpoint: config.base_url.clone(),
            model: config.model.clone(),
            limiter: RateLimiter::new(PROVIDER, config.limits()),
        })
    }

    /// Replace the API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    fn build_input(&self, request: &ImageRequest) -> TaleweaverResult<RunwareInput> {
        Ok(RunwareInput::builder()
            .prompt(request.prompt().clone())
            .aspect_ratio(request.aspect_ratio().clone())
            .style(request.art_style().clone())
            .model(self.model.clone())
            .seed(*request.seed())
            .width(*request.width())
            .height(*request.height())
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?)
    }

    async fn infer(&self, api_key: &str, body: &RunwareRequest) -> TaleweaverResult<Illustration> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        let parsed: RunwareResponse = response.json().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::MalformedResponse(format!(
                "Failed to parse Runware response: {}",
                e
            )))
        })?;

        let result = parsed.into_first().ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::MalformedResponse(
                "Runware did not return image data".to_string(),
            ))
        })?;
        let encoded = result
            .image_base64
            .as_deref()
            .filter(|data| !data.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::MalformedResponse(
                    "Runware did not return image data".to_string(),
                ))
            })?;

        let payload = encoded
            .split_once(";base64,")
            .map(|(_, rest)| rest)
            .unwrap_or(encoded);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ProviderError::new(ProviderErrorKind::Decode(e.to_string())))?;

        Ok(Illustration {
            bytes,
            content_type: "image/png".to_string(),
            seed: result.parameters.seed,
            request_id: result.request_id,
        })
    }
}

#[async_trait]
impl ImageGenerator for RunwareImageClient {
    #[instrument(skip(self, request), fields(page = ?request.page_number(), seed = ?request.seed()))]
    async fn generate_image(&self, request: &ImageRequest) -> TaleweaverResult<Illustration> {
        let api_key = require_key(&self.api_key, API_KEY_VAR)?;
        let body = RunwareRequest::single(self.build_input(request)?);
        debug!(style = %request.art_style(), aspect_ratio = %request.aspect_ratio(), "Requesting illustration");

        let illustration = self.limiter.execute(|| self.infer(api_key, &body)).await?;
        info!(
            size = illustration.bytes.len(),
            request_id = ?illustration.request_id,
            "Generated illustration"
        );
        Ok(illustration)
    }
}
