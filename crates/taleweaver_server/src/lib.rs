//! HTTP surface for the Taleweaver storybook service.
//!
//! Everything lives under `/api/story`, with stored assets served from
//! `/audio` and `/images`:
//!
//! | Route | Answer |
//! |---|---|
//! | `POST /api/story/build` | `202 {storyId, story}`, assets build in the background |
//! | `GET /api/story/{id}/status` | job progress and page states |
//! | `GET /api/story/{id}/page/{n}` | one page with its assets |
//! | `GET /api/story/{id}/logs` | page logs, oldest first |
//! | `POST /api/story/generate` | story text only |
//! | `POST /api/story/bundle` | the whole story with assets, synchronously |
//! | `POST /api/story/narrate`, `/illustrate` | one clip or image, inline |
//! | `POST /api/story/narrate-pages`, `/generate-images` | batch page assets |
//! | `GET /api/story/voices`, `/narrator-voices` | voice listings |
//!
//! Errors are JSON `{error, details?}` with a status derived from the
//! error kind, see [`ApiError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use taleweaver_rate_limit::TaleweaverConfig;
//! use taleweaver_server::{AppState, router};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = TaleweaverConfig::load()?;
//! let state = AppState::from_config(&config)?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, router(state)).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dto;
mod error;
mod extract;
mod routes;
mod state;
mod telemetry;

pub use dto::{
    CharacterInput, GenerateImagesBody, IllustrateBody, LogsResponse, NarrateBody,
    NarratePagesBody, PageBody, PageResponse, StatusResponse, StoryBody,
};
pub use error::{ApiError, status_for};
pub use extract::ApiJson;
pub use routes::router;
pub use state::AppState;
pub use telemetry::init_tracing;
