//! Shared state handed to every proxy handler.

use axum::http::HeaderValue;
use storegate_config::{ProxyConfig, UpstreamConfig};
use storegate_telemetry::Metrics;

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::HEADER_STORE;
use crate::http::forward::Forwarder;

pub(crate) struct ApiState {
    pub(crate) upstream: UpstreamConfig,
    pub(crate) store_header: Option<HeaderValue>,
    pub(crate) max_upload_bytes: usize,
    pub(crate) forwarder: Forwarder,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) fn new(config: &ProxyConfig, telemetry: Metrics) -> ApiServerResult<Self> {
        let store_header = config
            .upstream
            .store_code
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|source| ApiServerError::InvalidHeader {
                name: HEADER_STORE,
                source,
            })?;
        let forwarder = Forwarder::new(config.upstream.timeout, telemetry.clone())?;
        Ok(Self {
            upstream: config.upstream.clone(),
            store_header,
            max_upload_bytes: config.max_upload_bytes,
            forwarder,
            telemetry,
        })
    }
}
