//! Router and handlers.

use crate::{
    ApiError, ApiJson, AppState, GenerateImagesBody, IllustrateBody, LogsResponse, NarrateBody,
    NarratePagesBody, PageResponse, StatusResponse, StoryBody,
};
use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use taleweaver_error::{PipelineError, PipelineErrorKind, TaleweaverError};
use taleweaver_interface::StoryStateStore;
use taleweaver_pipeline::PageInput;
use taleweaver_storage::{AssetStorage, MediaType, content_type_for};
use tracing::{debug, info, instrument};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit();

    let story = Router::new()
        .route("/generate", post(generate_story))
        .route("/build", post(build_story))
        .route("/bundle", post(bundle_story))
        .route("/narrate", post(narrate))
        .route("/illustrate", post(illustrate))
        .route("/generate-images", post(generate_images))
        .route("/narrate-pages", post(narrate_pages))
        .route("/voices", get(list_voices))
        .route("/narrator-voices", get(narrator_voices))
        .route("/:story_id/status", get(story_status))
        .route("/:story_id/logs", get(story_logs))
        .route("/:story_id/page/:page_number", get(story_page));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/story", story)
        .route("/audio/*path", get(serve_audio))
        .route("/images/*path", get(serve_image))
        .fallback(not_found)
        .layer(middleware::from_fn(allow_any_origin))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Open CORS for the browser client; answers preflights directly.
async fn allow_any_origin(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}

fn story_not_found(story_id: &str) -> TaleweaverError {
    PipelineError::new(PipelineErrorKind::StoryNotFound(story_id.to_string())).into()
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let active = state.pipeline().runner().active().await.len();
    (StatusCode::OK, Json(json!({"status": "ok", "activeBuilds": active})))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}

#[instrument(skip_all)]
async fn generate_story(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let options = body.options()?;
    let story = state.pipeline().generate_story(&options).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

#[instrument(skip_all)]
async fn build_story(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.build_request()?;
    let ticket = state.pipeline().start_build(request).await?;
    info!(story_id = %ticket.story_id, pages = ticket.story.pages.len(), "Build accepted");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"storyId": ticket.story_id, "story": ticket.story})),
    ))
}

#[instrument(skip_all)]
async fn bundle_story(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.build_request()?;
    let bundle = state.pipeline().bundle(request).await?;
    Ok((StatusCode::CREATED, Json(bundle)))
}

#[instrument(skip_all)]
async fn narrate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NarrateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let narration = state
        .pipeline()
        .narrate(
            body.text.as_deref().unwrap_or_default(),
            body.voice_id.as_deref(),
            body.voice_settings,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(narration)))
}

#[instrument(skip_all)]
async fn illustrate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<IllustrateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let illustration = state.pipeline().illustrate(body.into()).await?;
    Ok((StatusCode::CREATED, Json(illustration)))
}

#[instrument(skip_all)]
async fn generate_images(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateImagesBody>,
) -> Result<impl IntoResponse, ApiError> {
    let pages: Vec<PageInput> = body.pages.into_iter().map(PageInput::from).collect();
    debug!(pages = pages.len(), "Illustrating pages");
    let images = state
        .pipeline()
        .generate_images(&pages, body.art_style.as_deref(), body.aspect_ratio.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({"images": images}))))
}

#[instrument(skip_all)]
async fn narrate_pages(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NarratePagesBody>,
) -> Result<impl IntoResponse, ApiError> {
    let pages: Vec<PageInput> = body.pages.into_iter().map(PageInput::from).collect();
    debug!(pages = pages.len(), "Narrating pages");
    let audios = state
        .pipeline()
        .narrate_pages(&pages, body.voice_id.as_deref(), body.voice_alias.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({"audios": audios}))))
}

async fn list_voices(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let voices = state.pipeline().list_voices().await?;
    Ok(Json(json!({"voices": voices})))
}

async fn narrator_voices(State(state): State<AppState>) -> impl IntoResponse {
    let voices = state.pipeline().narrator_voices();
    Json(json!({"total": voices.len(), "voices": voices}))
}

#[instrument(skip(state))]
async fn story_status(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let job = state
        .pipeline()
        .store()
        .get(&story_id)
        .await
        .ok_or_else(|| story_not_found(&story_id))?;
    debug!(progress = job.progress, "Status polled");
    Ok(Json(job.into()))
}

#[instrument(skip(state))]
async fn story_logs(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<Json<LogsResponse>, ApiError> {
    let logs = state.pipeline().store().logs(&story_id).await?;
    Ok(Json(LogsResponse { story_id, logs }))
}

#[instrument(skip(state))]
async fn story_page(
    State(state): State<AppState>,
    Path((story_id, page_number)): Path<(String, String)>,
) -> Result<Json<PageResponse>, ApiError> {
    let job = state
        .pipeline()
        .store()
        .get(&story_id)
        .await
        .ok_or_else(|| story_not_found(&story_id))?;

    let page_not_found = || ApiError::new(StatusCode::NOT_FOUND, "Page not found");
    let number: u32 = page_number.trim().parse().map_err(|_| page_not_found())?;
    let (Some(page_state), Some(content)) = (job.page(number), job.story.page(number)) else {
        return Err(page_not_found());
    };

    Ok(Json(PageResponse {
        page_number: number,
        status: page_state.status,
        assets: page_state.assets.clone(),
        content: content.clone(),
    }))
}

async fn serve_audio(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    serve_asset(&state, MediaType::Audio, &path).await
}

async fn serve_image(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    serve_asset(&state, MediaType::Image, &path).await
}

async fn serve_asset(state: &AppState, media: MediaType, path: &str) -> Result<Response, ApiError> {
    let public_path = format!("/{}/{}", media.directory(), path.trim_start_matches('/'));
    let bytes = state.pipeline().storage().retrieve(&public_path).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(path))], bytes).into_response())
}
