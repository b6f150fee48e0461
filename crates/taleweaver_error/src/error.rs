//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, JsonError, PipelineError, ProviderError, StorageError,
    ValidationError,
};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{TaleweaverError, TaleweaverErrorKind, ConfigError};
///
/// let err: TaleweaverError = ConfigError::new("OPENAI_API_KEY is not configured").into();
/// assert!(matches!(err.kind(), TaleweaverErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TaleweaverErrorKind {
    /// Missing credentials or invalid configuration
    #[from(ConfigError)]
    Config(ConfigError),
    /// Rejected client input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Upstream provider failure (text, speech, image)
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Asset storage failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Pipeline bookkeeping failure
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
}

/// Taleweaver error with kind discrimination.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{TaleweaverResult, ValidationError};
///
/// fn might_fail() -> TaleweaverResult<()> {
///     Err(ValidationError::new("pages array is required."))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Taleweaver Error: {}", _0)]
pub struct TaleweaverError(Box<TaleweaverErrorKind>);

impl TaleweaverError {
    /// Create a new error from a kind.
    pub fn new(kind: TaleweaverErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TaleweaverErrorKind {
        &self.0
    }

    /// Short human readable message without location details.
    pub fn message(&self) -> String {
        match self.kind() {
            TaleweaverErrorKind::Config(e) => e.message.clone(),
            TaleweaverErrorKind::Validation(e) => e.message.clone(),
            TaleweaverErrorKind::Provider(e) => e.kind.to_string(),
            TaleweaverErrorKind::Storage(e) => e.kind.to_string(),
            TaleweaverErrorKind::Pipeline(e) => e.kind.to_string(),
            TaleweaverErrorKind::Json(e) => e.message.clone(),
            TaleweaverErrorKind::Builder(e) => e.kind().to_string(),
        }
    }
}

// Generic From implementation for any type that converts to TaleweaverErrorKind
impl<T> From<T> for TaleweaverError
where
    T: Into<TaleweaverErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Taleweaver operations.
pub type TaleweaverResult<T> = std::result::Result<T, TaleweaverError>;
