//! Story build orchestration for Taleweaver.
//!
//! A build runs in two phases:
//!
//! 1. **Prepare** (in the request): validate options, generate the story,
//!    resolve the narrator, create a job with every page pending.
//! 2. **Run** (in the background): build each page's audio and
//!    illustration, recording progress, assets and partial failures in the
//!    [`StoryStateStore`](taleweaver_interface::StoryStateStore).
//!
//! Clients poll the store while phase two runs. Every page ends in a
//! terminal status: provider failures become [`PageError`](taleweaver_core::PageError)
//! records and a panicking page is marked failed.
//!
//! # Components
//!
//! | Type | Role |
//! |---|---|
//! | [`StoryPipeline`] | Entry point; holds every collaborator |
//! | [`PreparedBuild`] | A created job whose page loop has not run |
//! | [`PageBuilder`] | Builds one page's assets, never fails |
//! | [`InMemoryStoryStore`] | Job state behind an `RwLock` |
//! | [`ConcatMixer`] | Joins MP3 segments into page audio |
//! | [`TaskRunner`] | Supervised background tasks |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod mixer;
mod narrator;
mod operations;
mod pipeline;
mod request;
mod store;
mod tasks;

pub use builder::{PageBuild, PageBuildOptions, PageBuilder, PageContext};
pub use mixer::ConcatMixer;
pub use narrator::{NarratorChoice, USER_VOICE_NAME, USER_VOICE_SETTINGS};
pub use operations::{
    Bundle, BundlePage, GeneratedImage, IllustrateRequest, IllustrationMeta, IllustrationResult,
    NarratedPage, Narration, PageInput,
};
pub use pipeline::{
    BuildSummary, BuildTicket, PreparedBuild, StoryPipeline, StoryPipelineBuilder,
};
pub use request::BuildRequest;
pub use store::{InMemoryStoryStore, StoreLimits};
pub use tasks::TaskRunner;
