//! Typed configuration models for the proxy.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use url::Url;

use crate::defaults::{DEFAULT_BIND_ADDR, DEFAULT_HTTP_PORT, DEFAULT_MAX_UPLOAD_BYTES};

/// Resolved upstream endpoints and request decorations.
///
/// Every URL is optional: a missing upstream is reported by the handler that
/// needs it at call time rather than failing startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL of the upstream REST API.
    pub rest_base: Option<Url>,
    /// Upstream GraphQL endpoint.
    pub graphql_url: Option<Url>,
    /// Upstream bulk product import endpoint.
    pub import_products_url: Option<Url>,
    /// Upstream import job listing endpoint.
    pub import_user_jobs_url: Option<Url>,
    /// Value forwarded in the upstream `store` header.
    pub store_code: Option<String>,
    /// Optional deadline applied to every upstream call.
    pub timeout: Option<Duration>,
}

/// Complete proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Listener address.
    pub bind_addr: IpAddr,
    /// Listener port.
    pub http_port: u16,
    /// Largest request body buffered for pass-through.
    pub max_upload_bytes: usize,
    /// Upstream endpoints.
    pub upstream: UpstreamConfig,
    /// Log level override.
    pub log_level: Option<String>,
    /// Log format override.
    pub log_format: Option<String>,
}

impl ProxyConfig {
    /// Socket address the listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            http_port: DEFAULT_HTTP_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upstream: UpstreamConfig::default(),
            log_level: None,
            log_format: None,
        }
    }
}
