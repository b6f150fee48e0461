//! Trait definitions for the Taleweaver storybook pipeline.
//!
//! The pipeline talks to every external service and to its own job store
//! through the traits in this crate, so tests can swap in scripted doubles.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{AudioMixer, ImageGenerator, SpeechSynthesizer, StoryGenerator, StoryStateStore};
pub use types::{
    AudioClip, AudioSegment, Illustration, ImageRequest, ImageRequestBuilder, SegmentKind,
    SoundEffectRequest, SpeechRequest, VoiceSample, VoiceSummary,
};
