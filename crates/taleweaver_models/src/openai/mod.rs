//! Story generation through an OpenAI-compatible chat completions API.

mod client;
mod dto;
pub mod prompt;

pub use client::OpenAiStoryClient;
pub use dto::{
    ChatChoice, ChatChoiceMessage, ChatCompletionRequest, ChatCompletionRequestBuilder,
    ChatCompletionResponse, ChatMessage, ResponseFormat,
};
