//! Error types for the Taleweaver storybook pipeline.
//!
//! This crate provides the foundation error types used throughout the Taleweaver workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Partial page failures are deliberately *not* errors: the pipeline records
//! them on the page state and keeps going.
//!
//! # Examples
//!
//! ```
//! use taleweaver_error::{TaleweaverResult, ValidationError};
//!
//! fn check_theme(theme: &str) -> TaleweaverResult<()> {
//!     if theme.is_empty() {
//!         Err(ValidationError::new("Missing required fields: theme"))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_theme("").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod json;
mod pipeline;
mod provider;
mod storage;
mod validation;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{TaleweaverError, TaleweaverErrorKind, TaleweaverResult};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::ValidationError;
