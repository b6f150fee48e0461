//! Illustrations through the Runware image inference API.

mod client;
mod dto;

pub use client::RunwareImageClient;
pub use dto::{
    NEGATIVE_PROMPT, RunwareInput, RunwareInputBuilder, RunwareParameters, RunwareRequest,
    RunwareResponse, RunwareResult,
};
