//! Asset storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create an asset directory
    #[display("Failed to create asset directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write an asset
    #[display("Failed to write asset: {}", _0)]
    FileWrite(String),
    /// Failed to read an asset
    #[display("Failed to read asset: {}", _0)]
    FileRead(String),
    /// Asset not found
    #[display("Asset not found: {}", _0)]
    NotFound(String),
    /// Path escapes the storage root or is otherwise malformed
    #[display("Invalid asset path: {}", _0)]
    InvalidPath(String),
    /// Payload could not be decoded (e.g. bad base64)
    #[display("Invalid asset payload: {}", _0)]
    InvalidPayload(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("audio/abc/page-1.mp3".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
