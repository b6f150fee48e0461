//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use taleweaver_error::{
    PipelineErrorKind, ProviderErrorKind, StorageErrorKind, TaleweaverError, TaleweaverErrorKind,
};

/// Status code for a workspace error.
///
/// Client input is a 400 and unknown jobs are a 404. Upstream HTTP failures
/// keep the provider's status; other upstream failures are a 502, or a 504
/// when the call timed out. Disabled features and unusable page state
/// answer 503. Configuration and storage faults are 500s.
///
/// # Examples
///
/// ```
/// use axum::http::StatusCode;
/// use taleweaver_error::{PipelineError, PipelineErrorKind, TaleweaverError};
/// use taleweaver_server::status_for;
///
/// let err: TaleweaverError =
///     PipelineError::new(PipelineErrorKind::StoryNotFound("abc".to_string())).into();
/// assert_eq!(status_for(&err), StatusCode::NOT_FOUND);
/// ```
pub fn status_for(err: &TaleweaverError) -> StatusCode {
    match err.kind() {
        TaleweaverErrorKind::Validation(_) => StatusCode::BAD_REQUEST,
        TaleweaverErrorKind::Config(_)
        | TaleweaverErrorKind::Json(_)
        | TaleweaverErrorKind::Builder(_) => StatusCode::INTERNAL_SERVER_ERROR,
        TaleweaverErrorKind::Provider(e) => match &e.kind {
            ProviderErrorKind::MissingApiKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProviderErrorKind::Http { status_code, .. } => StatusCode::from_u16(*status_code)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ProviderErrorKind::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProviderErrorKind::Request(_)
            | ProviderErrorKind::MalformedResponse(_)
            | ProviderErrorKind::Decode(_) => StatusCode::BAD_GATEWAY,
        },
        TaleweaverErrorKind::Storage(e) => match &e.kind {
            StorageErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            StorageErrorKind::InvalidPath(_) | StorageErrorKind::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        TaleweaverErrorKind::Pipeline(e) => match &e.kind {
            PipelineErrorKind::StoryNotFound(_) | PipelineErrorKind::PageNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            PipelineErrorKind::FeatureDisabled(_)
            | PipelineErrorKind::InvalidTransition { .. }
            | PipelineErrorKind::Mixing(_) => StatusCode::SERVICE_UNAVAILABLE,
            PipelineErrorKind::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}: {}", status, error)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    /// Error with a status and message.
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    /// Attach a detail string.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Client facing message.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Extra detail, when there is any.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl From<TaleweaverError> for ApiError {
    fn from(err: TaleweaverError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %err, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %err, "Request rejected");
        }

        match err.kind() {
            TaleweaverErrorKind::Provider(e) => match &e.kind {
                ProviderErrorKind::Http { provider, body, .. } => {
                    Self::new(status, format!("{} request failed", provider)).with_details(body)
                }
                other => Self::new(status, other.to_string()),
            },
            _ => Self::new(status, err.message()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            other => other,
        };
        tracing::debug!(status = status.as_u16(), rejection = %rejection, "Rejected request body");
        Self::new(status, "Invalid request body").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.error,
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}
