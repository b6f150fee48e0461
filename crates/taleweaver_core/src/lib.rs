//! Core data types for the Taleweaver storybook pipeline.
//!
//! This crate provides the story model shared by every other crate: the
//! generated [`Story`] and its [`Page`]s, the [`Beat`] timeline, voice
//! settings, and the per-build [`PipelineJob`] tracked for polling clients.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod beat;
mod character;
mod job;
mod options;
mod page;
mod parse;
mod story;
mod timeline;
mod voice;

pub use beat::Beat;
pub use character::{Character, Gender, parse_traits};
pub use job::{
    AssetRef, ErrorStage, LogEntry, PageAssets, PageError, PagePatch, PageState, PageStatus,
    PipelineJob, StoryLogEntry,
};
pub use options::{StoryOptions, StoryOptionsBuilder};
pub use page::Page;
pub use parse::{ParsedStory, parse_generated_story};
pub use story::{Story, StoryMetadata, StorySummary};
pub use timeline::{
    NormalizedTimeline, TimelineWarning, TimelineWarningKind, dialogue_text, normalize_timeline,
    timeline_to_markdown,
};
pub use voice::{VoiceProfile, VoiceSettings};
