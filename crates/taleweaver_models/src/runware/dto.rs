//! Runware image inference wire types.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Negative prompt applied to every illustration.
pub const NEGATIVE_PROMPT: &str = "blurry, violent, scary, photorealistic, inconsistent characters";

/// Image inference request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwareRequest {
    /// Always `imageInference`
    pub task_type: String,
    /// One input per image
    pub inputs: Vec<RunwareInput>,
}

impl RunwareRequest {
    /// A single-image inference task.
    pub fn single(input: RunwareInput) -> Self {
        Self {
            task_type: "imageInference".to_string(),
            inputs: vec![input],
        }
    }
}

/// One image to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct RunwareInput {
    /// Scene description
    prompt: String,
    /// Aspect ratio, e.g. `3:2`
    aspect_ratio: String,
    /// Art style label
    style: String,
    /// Model name
    model: String,
    /// Shared seed
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    /// Output width in pixels
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    /// Output height in pixels
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    /// Things to avoid
    #[builder(default = "NEGATIVE_PROMPT.to_string()")]
    negative_prompt: String,
    /// Diffusion steps
    #[builder(default = "30")]
    steps: u32,
    /// Prompt adherence
    #[builder(default = "7.4")]
    guidance_scale: f32,
}

impl RunwareInput {
    /// Creates a new builder.
    pub fn builder() -> RunwareInputBuilder {
        RunwareInputBuilder::default()
    }
}

/// Parameters echoed back by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunwareParameters {
    /// Seed actually used
    #[serde(default)]
    pub seed: Option<u64>,
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunwareResult {
    /// Base64 image data
    #[serde(default)]
    pub image_base64: Option<String>,
    /// Provider request id
    #[serde(default)]
    pub request_id: Option<String>,
    /// Echoed parameters
    #[serde(default)]
    pub parameters: RunwareParameters,
}

/// The provider answers with either a bare result or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RunwareResponse {
    /// `[ {...}, ... ]`
    Many(Vec<RunwareResult>),
    /// `{...}`
    One(RunwareResult),
}

impl RunwareResponse {
    /// The first result.
    pub fn into_first(self) -> Option<RunwareResult> {
        match self {
            RunwareResponse::Many(results) => results.into_iter().next(),
            RunwareResponse::One(result) => Some(result),
        }
    }
}
