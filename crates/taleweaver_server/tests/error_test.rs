//! Error to status mapping.

use axum::http::StatusCode;
use taleweaver_error::{
    ConfigError, PipelineError, PipelineErrorKind, ProviderError, ProviderErrorKind, StorageError,
    StorageErrorKind, TaleweaverError, ValidationError,
};
use taleweaver_server::{ApiError, status_for};

fn provider(kind: ProviderErrorKind) -> TaleweaverError {
    ProviderError::new(kind).into()
}

fn pipeline(kind: PipelineErrorKind) -> TaleweaverError {
    PipelineError::new(kind).into()
}

#[test]
fn test_client_and_lookup_errors() {
    assert_eq!(
        status_for(&ValidationError::new("bad").into()),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_for(&pipeline(PipelineErrorKind::StoryNotFound("x".to_string()))),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        status_for(&pipeline(PipelineErrorKind::PageNotFound {
            story_id: "x".to_string(),
            page: 4
        })),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_provider_errors() {
    let http = |status_code| {
        provider(ProviderErrorKind::Http {
            provider: "runware".to_string(),
            status_code,
            body: "nope".to_string(),
        })
    };
    assert_eq!(status_for(&http(401)), StatusCode::UNAUTHORIZED);
    assert_eq!(status_for(&http(503)), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(status_for(&http(302)), StatusCode::BAD_GATEWAY);

    assert_eq!(
        status_for(&provider(ProviderErrorKind::MalformedResponse(
            "no audio".to_string()
        ))),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        status_for(&provider(ProviderErrorKind::Timeout {
            provider: "openai".to_string(),
            seconds: 120
        })),
        StatusCode::GATEWAY_TIMEOUT
    );
    assert_eq!(
        status_for(&provider(ProviderErrorKind::MissingApiKey(
            "RUNWARE_API_KEY".to_string()
        ))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_service_state_errors() {
    assert_eq!(
        status_for(&pipeline(PipelineErrorKind::FeatureDisabled("bundle".to_string()))),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        status_for(&pipeline(PipelineErrorKind::Mixing("empty".to_string()))),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        status_for(&ConfigError::new("missing").into()),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_for(&StorageError::new(StorageErrorKind::FileWrite("disk".to_string())).into()),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_for(&StorageError::new(StorageErrorKind::NotFound("/audio/x".to_string())).into()),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_api_error_body_fields() {
    let err = ApiError::from(provider(ProviderErrorKind::Http {
        provider: "elevenlabs".to_string(),
        status_code: 422,
        body: "{\"detail\":\"bad voice\"}".to_string(),
    }));
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.error(), "elevenlabs request failed");
    assert_eq!(err.details(), Some("{\"detail\":\"bad voice\"}"));

    let err = ApiError::from(TaleweaverError::from(ValidationError::new(
        "Text is required for narration.",
    )));
    assert_eq!(err.error(), "Text is required for narration.");
    assert!(err.details().is_none());
}
