//! Fallback values and environment variable names for the proxy configuration.
//!
//! # Design
//! - Centralize defaults so the loader, the binary, and tests agree on them.
//! - Keep upstream paths explicit for auditability.

use std::net::{IpAddr, Ipv4Addr};

/// Default listener address.
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
/// Default listener port.
pub const DEFAULT_HTTP_PORT: u16 = 3000;
/// Path appended to the REST base when no GraphQL URL is configured.
pub const DEFAULT_GRAPHQL_PATH: &str = "/graphql";
/// Upstream path receiving bulk product imports.
pub const DEFAULT_IMPORT_PRODUCTS_PATH: &str = "/rest/V1/dropship/import-products";
/// Upstream path listing the caller's import jobs.
pub const DEFAULT_IMPORT_USER_JOBS_PATH: &str = "/rest/V1/dropship/import-user-jobs";
/// Largest request body buffered for pass-through (64 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Environment variable names consulted by the loader.
pub mod env {
    /// Listener address.
    pub const BIND_ADDR: &str = "STOREGATE_BIND_ADDR";
    /// Listener port.
    pub const HTTP_PORT: &str = "STOREGATE_HTTP_PORT";
    /// Upstream REST base URL.
    pub const UPSTREAM_REST_URL: &str = "STOREGATE_UPSTREAM_REST_URL";
    /// Legacy name for the upstream REST base URL.
    pub const UPSTREAM_REST_URL_LEGACY: &str = "MAGENTO_BASE_URL";
    /// Upstream GraphQL URL.
    pub const UPSTREAM_GRAPHQL_URL: &str = "STOREGATE_UPSTREAM_GRAPHQL_URL";
    /// Value of the upstream `store` header.
    pub const STORE_CODE: &str = "STOREGATE_STORE_CODE";
    /// Bulk import path override.
    pub const IMPORT_PRODUCTS_PATH: &str = "STOREGATE_IMPORT_PRODUCTS_PATH";
    /// User-jobs path override.
    pub const IMPORT_USER_JOBS_PATH: &str = "STOREGATE_IMPORT_USER_JOBS_PATH";
    /// Body buffering limit in bytes.
    pub const MAX_UPLOAD_BYTES: &str = "STOREGATE_MAX_UPLOAD_BYTES";
    /// Optional upstream timeout in seconds.
    pub const UPSTREAM_TIMEOUT_SECS: &str = "STOREGATE_UPSTREAM_TIMEOUT_SECS";
    /// Log level override.
    pub const LOG_LEVEL: &str = "STOREGATE_LOG_LEVEL";
    /// Log format override (`json` or `pretty`).
    pub const LOG_FORMAT: &str = "STOREGATE_LOG_FORMAT";
}
