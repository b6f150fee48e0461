//! Voice resolution for the Taleweaver storybook pipeline.
//!
//! Turns aliases, character traits and narration tones into provider voice
//! ids and settings. Everything here is pure: the alias tables live in an
//! immutable [`VoiceCatalog`] and nothing touches the network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod catalog;
mod effects;
mod emotion;
mod resolver;

pub use cache::VoiceCache;
pub use catalog::{CatalogVoice, CharacterVoiceTable, GenderVoices, VoiceCatalog, normalize_alias};
pub use effects::sfx_duration_hint;
pub use emotion::EmotionPreset;
pub use resolver::{CharacterRole, NarrationTone, VoiceCategory, VoiceResolver};
