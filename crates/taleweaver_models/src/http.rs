//! Shared HTTP plumbing for the provider clients.

use reqwest::{Client, Response};
use std::time::Duration;
use taleweaver_error::{ProviderError, ProviderErrorKind, TaleweaverResult};
use tracing::error;

const USER_AGENT: &str = concat!("taleweaver/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by one provider.
///
/// The per-call deadline belongs to the rate limiter; the connect timeout
/// only stops a dead host from holding a limiter slot.
pub(crate) fn build_client() -> TaleweaverResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
        .map_err(|e| ProviderError::new(ProviderErrorKind::Request(e.to_string())).into())
}

/// Read an API key from the environment, treating blank values as unset.
pub(crate) fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// The configured key, or [`ProviderErrorKind::MissingApiKey`] naming `var`.
pub(crate) fn require_key<'a>(key: &'a Option<String>, var: &str) -> TaleweaverResult<&'a str> {
    key.as_deref()
        .ok_or_else(|| ProviderError::new(ProviderErrorKind::MissingApiKey(var.to_string())).into())
}

/// Map a transport failure.
pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> ProviderError {
    ProviderError::new(ProviderErrorKind::Request(format!("{}: {}", provider, e)))
}

/// Pass 2xx responses through; read and log the body of anything else.
pub(crate) async fn check_status(provider: &str, response: Response) -> TaleweaverResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(provider, status = status.as_u16(), body = %body, "Provider returned error status");
    Err(ProviderError::new(ProviderErrorKind::Http {
        provider: provider.to_string(),
        status_code: status.as_u16(),
        body,
    })
    .into())
}

/// Read the full body of a successful response.
pub(crate) async fn read_bytes(provider: &str, response: Response) -> TaleweaverResult<Vec<u8>> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(provider, e))?;
    Ok(bytes.to_vec())
}
