//! Recording mock of an upstream HTTP service.
//!
//! Binds an axum server to an ephemeral loopback port, records every request
//! it receives and answers each one with a configurable canned response.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Canned reply served by [`MockUpstream`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code to answer with.
    pub status: StatusCode,
    /// Optional `Content-Type` header.
    pub content_type: Option<String>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Reply with `status` and no body.
    #[must_use]
    pub const fn status(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Reply with a JSON document.
    #[must_use]
    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into().into_bytes(),
        }
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Replace the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::json(StatusCode::OK, r#"{"data":{}}"#)
    }
}

/// A request observed by [`MockUpstream`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// Request headers as received.
    pub headers: HeaderMap,
    /// Request body bytes.
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Value of header `name`, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }
}

struct MockState {
    response: Mutex<MockResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Running mock upstream; the server stops when the handle is dropped.
pub struct MockUpstream {
    addr: SocketAddr,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockUpstream {
    /// Start a server that answers every request with `response`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loopback listener cannot be bound.
    pub async fn start(response: MockResponse) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind mock upstream listener")?;
        let addr = listener
            .local_addr()
            .context("failed to read mock upstream address")?;
        let state = Arc::new(MockState {
            response: Mutex::new(response),
            requests: Mutex::new(Vec::new()),
        });
        let router = Router::new()
            .fallback(record)
            .with_state(Arc::clone(&state));
        let task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                eprintln!("mock upstream stopped: {err}");
            }
        });
        Ok(Self { addr, state, task })
    }

    /// Address the server listens on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL (`http://host:port`) of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Absolute URL for `path` on the server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// Change the reply served from now on.
    pub fn set_response(&self, response: MockResponse) {
        *guard(&self.state.response) = response;
    }

    /// All requests observed so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        guard(&self.state.requests).clone()
    }

    /// Most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        guard(&self.state.requests).last().cloned()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn record(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    guard(&state.requests).push(RecordedRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body: body.to_vec(),
    });

    let reply = guard(&state.response).clone();
    let mut builder = Response::builder().status(reply.status);
    if let Some(content_type) = reply.content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder
        .body(Body::from(reply.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
