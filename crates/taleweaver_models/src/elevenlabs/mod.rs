//! Speech, sound effects and voice cloning through ElevenLabs.

mod client;
mod dto;

pub use client::ElevenLabsClient;
pub use dto::{
    AddVoiceResponse, ElevenLabsVoice, ElevenLabsVoiceSettings, SoundGenerationRequest,
    TextToSpeechRequest, VoicesResponse,
};
