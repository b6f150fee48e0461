//! Test utilities for provider client tests.
//!
//! [`MockUpstream`] is a local axum server that records every request and
//! answers from a script. The last scripted response repeats.

#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use taleweaver_rate_limit::ProviderConfig;

/// One scripted reply.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Scripted {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    pub fn audio(bytes: &[u8]) -> Self {
        Self {
            status: 200,
            content_type: "audio/mpeg",
            body: bytes.to_vec(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
        }
    }
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Scripted>,
    last: Option<Scripted>,
    requests: Vec<Recorded>,
}

/// Scripted upstream provider.
#[derive(Clone, Default)]
pub struct MockUpstream {
    inner: Arc<Mutex<Inner>>,
}

impl MockUpstream {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                script: script.into(),
                ..Default::default()
            })),
        }
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn start(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("mock address");
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock upstream");
        });
        format!("http://{}", addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().expect("mock lock").requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().expect("mock lock").requests.len()
    }
}

async fn handle(
    State(mock): State<MockUpstream>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let reply = {
        let mut inner = mock.inner.lock().expect("mock lock");
        inner.requests.push(Recorded {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            body: body.to_vec(),
        });
        match inner.script.pop_front() {
            Some(next) => {
                inner.last = Some(next.clone());
                next
            }
            None => inner
                .last
                .clone()
                .unwrap_or_else(|| Scripted::text(500, "no scripted response")),
        }
    };

    (
        StatusCode::from_u16(reply.status).expect("valid status"),
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

/// Provider settings pointing at a mock, with fast retries.
pub fn provider_config(base_url: &str, max_retries: usize) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        temperature: Some(0.8),
        timeout_secs: 5,
        max_retries,
        initial_backoff_ms: Some(1),
        ..Default::default()
    }
}
