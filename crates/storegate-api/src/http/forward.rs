//! Upstream pass-through shared by every proxy route.
//!
//! # Design
//! - Upstream status and body are relayed byte-for-byte; non-2xx answers are
//!   not errors from the proxy's point of view.
//! - Only a call that yields no upstream response becomes a generic 500.
//! - No retries. A deadline applies only when one is configured.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
    },
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use reqwest::Client;
use storegate_telemetry::{Metrics, UpstreamOutcome, current_request_id, upstream_span};
use tracing::{Instrument, debug, error, warn};
use url::Url;

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::PREFLIGHT_ALLOW_HEADERS;
use crate::http::errors::{ApiError, allow_list};

/// A request ready to be sent upstream.
#[derive(Debug)]
pub(crate) struct UpstreamRequest {
    /// Metric label naming the upstream.
    pub(crate) target: &'static str,
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
}

/// Per-call switches for [`Forwarder::forward`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ForwardOptions {
    /// Mirror the upstream `Content-Type` onto the response.
    pub(crate) expose_content_type: bool,
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Self {
            expose_content_type: true,
        }
    }
}

/// Shared upstream HTTP client.
#[derive(Clone)]
pub(crate) struct Forwarder {
    client: Client,
    telemetry: Metrics,
}

impl Forwarder {
    /// Build the client, applying `timeout` to every call when set.
    pub(crate) fn new(timeout: Option<Duration>, telemetry: Metrics) -> ApiServerResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| ApiServerError::HttpClient { source })?;
        Ok(Self { client, telemetry })
    }

    /// Send `request` and relay the upstream answer.
    pub(crate) async fn forward(
        &self,
        request: UpstreamRequest,
        options: ForwardOptions,
    ) -> Result<Response, ApiError> {
        let span = upstream_span(request.target);
        self.relay(request, options).instrument(span).await
    }

    async fn relay(
        &self,
        request: UpstreamRequest,
        options: ForwardOptions,
    ) -> Result<Response, ApiError> {
        let target = request.target;
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let upstream = builder.send().await.map_err(|err| {
            self.transport_failure(target, &err);
            ApiError::proxy()
        })?;
        let status = upstream.status();
        let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
        let body = upstream.bytes().await.map_err(|err| {
            self.transport_failure(target, &err);
            ApiError::proxy()
        })?;

        let outcome = if status.is_success() {
            UpstreamOutcome::Success
        } else {
            UpstreamOutcome::ErrorStatus
        };
        self.telemetry.inc_upstream_request(target, outcome);
        debug!(
            target_name = target,
            status = status.as_u16(),
            bytes = body.len(),
            "relaying upstream response"
        );

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        if options.expose_content_type
            && let Some(content_type) = content_type
        {
            headers.insert(CONTENT_TYPE, content_type);
        }
        Ok(response)
    }

    fn transport_failure(&self, target: &'static str, err: &reqwest::Error) {
        self.telemetry
            .inc_upstream_request(target, UpstreamOutcome::TransportFailure);
        error!(
            error = %err,
            target_name = target,
            request_id = %current_request_id(),
            timeout = err.is_timeout(),
            "upstream request failed"
        );
    }
}

/// 204 answer to a CORS preflight for a route serving `methods`.
pub(crate) fn preflight(methods: &[Method]) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    if let Ok(allowed) = HeaderValue::from_str(&allow_list(methods)) {
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, allowed);
    }
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(PREFLIGHT_ALLOW_HEADERS),
    );
    response
}

/// Read the whole request body into one buffer, rejecting bodies over `limit`.
pub(crate) async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| {
            warn!(error = %err, "failed to read request body");
            ApiError::bad_request("request body could not be read")
        })?;
        if buffer.len() + chunk.len() > limit {
            warn!(limit, "request body exceeds upload limit");
            return Err(ApiError::payload_too_large(limit));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buffer))
}
