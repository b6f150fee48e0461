//! Request validation errors.

/// Client input rejected before any pipeline work starts.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", message, line, file)]
pub struct ValidationError {
    /// What was wrong with the input
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Build the standard "missing required fields" message.
    ///
    /// # Examples
    ///
    /// ```
    /// use taleweaver_error::ValidationError;
    ///
    /// let err = ValidationError::missing_fields(&["theme", "genre"]);
    /// assert_eq!(err.message, "Missing required fields: theme, genre");
    /// ```
    #[track_caller]
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::new(format!("Missing required fields: {}", fields.join(", ")))
    }
}
