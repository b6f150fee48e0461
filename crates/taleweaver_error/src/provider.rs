//! Upstream provider errors and retry classification.

/// Failure conditions when talking to a text, speech or image provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// API key environment variable not set
    #[display("{} is not configured.", _0)]
    MissingApiKey(String),
    /// Transport level failure (connect, DNS, body read)
    #[display("Request failed: {}", _0)]
    Request(String),
    /// Provider answered with a non-success status
    #[display("{} request failed with status {}: {}", provider, status_code, body)]
    Http {
        /// Provider name
        provider: String,
        /// HTTP status code returned upstream
        status_code: u16,
        /// Response body, as text
        body: String,
    },
    /// Provider answered 2xx but the payload was unusable
    #[display("{}", _0)]
    MalformedResponse(String),
    /// Call exceeded its deadline
    #[display("{} request timed out after {}s", provider, seconds)]
    Timeout {
        /// Provider name
        provider: String,
        /// Deadline that elapsed
        seconds: u64,
    },
    /// Base64 or binary decode failure
    #[display("Decode error: {}", _0)]
    Decode(String),
}

impl ProviderErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            ProviderErrorKind::Request(_) => true,
            ProviderErrorKind::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            ProviderErrorKind::Http { status_code, .. } => match *status_code {
                429 => (3000, 3, 30),
                503 => (1000, 3, 20),
                500 | 502 | 504 => (500, 2, 8),
                _ => (1000, 3, 20),
            },
            ProviderErrorKind::Timeout { .. } => (1000, 1, 5),
            _ => (500, 2, 10),
        }
    }

    /// Upstream HTTP status when one is known.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderErrorKind::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::Http {
///     provider: "elevenlabs".to_string(),
///     status_code: 503,
///     body: "busy".to_string(),
/// });
/// assert!(err.is_retryable());
/// assert_eq!(err.kind.status_code(), Some(503));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// Transient errors like 503 (service unavailable), 429 (rate limit),
/// or network timeouts should return true. Permanent errors like 401
/// (unauthorized) or 400 (bad request) should return false.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (1000, 3, 20)
    }
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}

impl RetryableError for crate::TaleweaverError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            crate::TaleweaverErrorKind::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self.kind() {
            crate::TaleweaverErrorKind::Provider(e) => e.retry_strategy_params(),
            _ => (1000, 3, 20),
        }
    }
}
