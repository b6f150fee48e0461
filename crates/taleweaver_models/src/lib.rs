//! Provider integrations for Taleweaver.
//!
//! Each client wraps one upstream API behind a collaborator trait from
//! `taleweaver_interface` and owns a [`taleweaver_rate_limit::RateLimiter`]
//! that applies the provider's quota, concurrency cap, deadline and retry
//! policy to every call.
//!
//! | Client | Trait | Key |
//! |---|---|---|
//! | [`OpenAiStoryClient`] | `StoryGenerator` | `OPENAI_API_KEY` |
//! | [`ElevenLabsClient`] | `SpeechSynthesizer` | `ELEVENLABS_API_KEY` |
//! | [`RunwareImageClient`] | `ImageGenerator` | `RUNWARE_API_KEY` |
//!
//! Keys are read when a client is built. A missing key does not stop the
//! client from being built; calls that need it fail with
//! `ProviderErrorKind::MissingApiKey`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taleweaver_core::StoryOptions;
//! use taleweaver_interface::StoryGenerator;
//! use taleweaver_models::OpenAiStoryClient;
//! use taleweaver_rate_limit::TaleweaverConfig;
//! use taleweaver_voice::VoiceCatalog;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TaleweaverConfig::load()?;
//! let catalog = Arc::new(VoiceCatalog::builtin()?);
//! let client = OpenAiStoryClient::new(&config.providers.openai, catalog)?;
//!
//! let options = StoryOptions::builder()
//!     .theme("friendship")
//!     .genre("adventure")
//!     .target_age_group("5-7")
//!     .story_length(2u32)
//!     .build()?;
//! let parsed = client.generate_story(&options).await?;
//! println!("{}", parsed.story.title);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod elevenlabs;
mod http;
mod openai;
mod runware;

pub use elevenlabs::{
    AddVoiceResponse, ElevenLabsClient, ElevenLabsVoice, ElevenLabsVoiceSettings,
    SoundGenerationRequest, TextToSpeechRequest, VoicesResponse,
};
pub use openai::{
    ChatChoice, ChatChoiceMessage, ChatCompletionRequest, ChatCompletionRequestBuilder,
    ChatCompletionResponse, ChatMessage, OpenAiStoryClient, ResponseFormat, prompt,
};
pub use runware::{
    NEGATIVE_PROMPT, RunwareImageClient, RunwareInput, RunwareInputBuilder, RunwareParameters,
    RunwareRequest, RunwareResponse, RunwareResult,
};
