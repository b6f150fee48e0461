//! Per-build job state tracked for polling clients.

use crate::Story;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleweaver_error::{PipelineError, PipelineErrorKind};

/// Lifecycle of a single page.
///
/// `pending → processing → completed | failed`; terminal states are final.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PageStatus {
    /// Not started
    #[default]
    Pending,
    /// Builder is running
    Processing,
    /// Finished with at least the required assets
    Completed,
    /// Finished without usable assets
    Failed,
}

impl PageStatus {
    /// Whether this status is final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PageStatus::Completed | PageStatus::Failed)
    }

    /// Whether moving to `next` respects the lifecycle.
    pub fn can_transition_to(&self, next: PageStatus) -> bool {
        match self {
            PageStatus::Pending => true,
            PageStatus::Processing => next != PageStatus::Pending,
            PageStatus::Completed | PageStatus::Failed => *self == next,
        }
    }
}

/// Stored asset location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    /// Public path, e.g. `/audio/{story}/page-1.mp3`
    pub path: String,
    /// Absolute URL
    pub url: String,
}

/// Assets produced for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAssets {
    /// Illustration
    pub image: Option<AssetRef>,
    /// Mixed page audio
    pub audio: Option<AssetRef>,
}

/// Timestamped progress message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
    /// Message text
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped now.
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// A page log entry in the flattened per-story view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryLogEntry {
    /// Page the message belongs to
    pub page_number: u32,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
    /// Message text
    pub message: String,
}

/// Pipeline stage an error was raised in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorStage {
    /// Narration speech synthesis
    Narration,
    /// Dialogue speech synthesis
    Character,
    /// Sound effect synthesis
    Sfx,
    /// Audio mixing
    Mix,
    /// Writing an asset
    Storage,
    /// Illustration generation
    Image,
    /// Unexpected builder failure
    Page,
}

/// A recorded partial failure. Not an error value: the build continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageError {
    /// Human readable cause
    pub message: String,
    /// Where it happened
    pub stage: ErrorStage,
    /// Timeline position for beat-level failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beat_index: Option<usize>,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

impl PageError {
    /// Record an error stamped now.
    pub fn new(stage: ErrorStage, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage,
            beat_index: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the timeline index of the failing beat.
    pub fn at_beat(mut self, index: usize) -> Self {
        self.beat_index = Some(index);
        self
    }
}

/// Polling view of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    /// Page number
    pub page_number: u32,
    /// Lifecycle status
    pub status: PageStatus,
    /// Produced assets
    pub assets: PageAssets,
    /// Progress messages
    pub logs: Vec<LogEntry>,
    /// Partial failures
    pub errors: Vec<PageError>,
}

impl PageState {
    /// A fresh pending page.
    pub fn pending(page_number: u32) -> Self {
        Self {
            page_number,
            status: PageStatus::Pending,
            assets: PageAssets::default(),
            logs: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Apply a patch, rejecting status changes out of a terminal state.
    pub fn apply(&mut self, patch: PagePatch) -> Result<(), PipelineError> {
        if let Some(status) = patch.status {
            if !self.status.can_transition_to(status) {
                return Err(PipelineError::new(PipelineErrorKind::InvalidTransition {
                    page: self.page_number,
                    from: self.status.to_string(),
                    to: status.to_string(),
                }));
            }
            self.status = status;
        }
        if let Some(audio) = patch.audio {
            self.assets.audio = Some(audio);
        }
        if let Some(image) = patch.image {
            self.assets.image = Some(image);
        }
        self.errors.extend(patch.errors);
        Ok(())
    }
}

/// Partial update to a [`PageState`].
///
/// # Examples
///
/// ```
/// use taleweaver_core::{PagePatch, PageState, PageStatus};
///
/// let mut page = PageState::pending(1);
/// page.apply(PagePatch::default().with_status(PageStatus::Processing)).unwrap();
/// page.apply(PagePatch::default().with_status(PageStatus::Completed)).unwrap();
/// assert!(page.apply(PagePatch::default().with_status(PageStatus::Processing)).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct PagePatch {
    /// New status
    pub status: Option<PageStatus>,
    /// Audio asset to record
    pub audio: Option<AssetRef>,
    /// Image asset to record
    pub image: Option<AssetRef>,
    /// Errors to append
    pub errors: Vec<PageError>,
}

/// Everything tracked for one story build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJob {
    /// Job id
    pub story_id: String,
    /// The generated story
    pub story: Story,
    /// One state per story page, in page order
    pub pages: Vec<PageState>,
    /// Fraction of pages in a terminal state
    pub progress: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Set once every page is terminal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineJob {
    /// Create a job with every page pending.
    pub fn new(story_id: impl Into<String>, story: Story) -> Self {
        let pages = story
            .pages
            .iter()
            .map(|p| PageState::pending(p.page_number))
            .collect();
        let mut job = Self {
            story_id: story_id.into(),
            story,
            pages,
            progress: 0.0,
            created_at: Utc::now(),
            finished_at: None,
        };
        job.recompute_progress();
        job
    }

    /// Look up a page state.
    pub fn page(&self, page_number: u32) -> Option<&PageState> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    /// Look up a page state for mutation.
    pub fn page_mut(&mut self, page_number: u32) -> Option<&mut PageState> {
        self.pages.iter_mut().find(|p| p.page_number == page_number)
    }

    /// Every page log, oldest first.
    pub fn flattened_logs(&self) -> Vec<StoryLogEntry> {
        let mut logs: Vec<StoryLogEntry> = self
            .pages
            .iter()
            .flat_map(|page| {
                page.logs.iter().map(|entry| StoryLogEntry {
                    page_number: page.page_number,
                    timestamp: entry.timestamp,
                    message: entry.message.clone(),
                })
            })
            .collect();
        logs.sort_by_key(|entry| entry.timestamp);
        logs
    }

    /// Whether every page reached a terminal status.
    pub fn is_finished(&self) -> bool {
        self.pages.iter().all(|p| p.status.is_terminal())
    }

    /// Recompute `progress` as terminal pages over total pages.
    ///
    /// A job with no pages counts as complete.
    pub fn recompute_progress(&mut self) {
        let total = self.pages.len();
        let done = self
            .pages
            .iter()
            .filter(|p| p.status.is_terminal())
            .count();
        self.progress = if total == 0 {
            1.0
        } else {
            done as f64 / total as f64
        };
        if self.is_finished() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }
}
