//! Pipeline and state store errors.

/// Pipeline bookkeeping failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// No job is stored under this id
    #[display("Story not found: {}", _0)]
    StoryNotFound(String),
    /// Job exists but has no such page
    #[display("Page {} not found in story {}", page, story_id)]
    PageNotFound {
        /// Story id
        story_id: String,
        /// Requested page number
        page: u32,
    },
    /// Attempt to move a page out of a terminal status
    #[display("Page {} cannot move from {} to {}", page, from, to)]
    InvalidTransition {
        /// Page number
        page: u32,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },
    /// Audio segments could not be combined
    #[display("Audio mixing failed: {}", _0)]
    Mixing(String),
    /// Endpoint disabled through feature flags
    #[display("{} is disabled", _0)]
    FeatureDisabled(String),
    /// Background task failed or panicked
    #[display("Task failed: {}", _0)]
    Task(String),
}

/// Pipeline error with location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::StoryNotFound("abc".to_string()));
/// assert!(format!("{}", err).contains("Story not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
