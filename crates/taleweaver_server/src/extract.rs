//! Request body extraction.

use crate::ApiError;
use axum::extract::{FromRequest, Request};
use axum::{Json, async_trait};
use serde::de::DeserializeOwned;

/// JSON body whose rejections answer with the [`ApiError`] shape.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
