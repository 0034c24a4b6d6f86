//! Environment loader for [`ProxyConfig`].
//!
//! # Design
//! - Read every value through a lookup closure so tests never touch the process environment.
//! - Treat blank values as unset and fall back to the documented defaults.
//! - Reject malformed values at startup; missing upstream URLs are left for handlers to report.

use tracing::{debug, warn};

use crate::defaults::{
    DEFAULT_GRAPHQL_PATH, DEFAULT_IMPORT_PRODUCTS_PATH, DEFAULT_IMPORT_USER_JOBS_PATH, env,
};
use crate::error::ConfigResult;
use crate::model::{ProxyConfig, UpstreamConfig};
use crate::validate::{
    join_path, parse_bind_addr, parse_byte_limit, parse_http_url, parse_port, parse_timeout_secs,
};

impl ProxyConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a present value cannot be parsed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a present value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(value) = read(env::BIND_ADDR) {
            config.bind_addr = parse_bind_addr(env::BIND_ADDR, &value)?;
        }
        if let Some(value) = read(env::HTTP_PORT) {
            config.http_port = parse_port(env::HTTP_PORT, &value)?;
        }
        if let Some(value) = read(env::MAX_UPLOAD_BYTES) {
            config.max_upload_bytes = parse_byte_limit(env::MAX_UPLOAD_BYTES, &value)?;
        }
        config.log_level = read(env::LOG_LEVEL);
        config.log_format = read(env::LOG_FORMAT);
        config.upstream = load_upstream(&read)?;
        Ok(config)
    }
}

fn load_upstream<R>(read: &R) -> ConfigResult<UpstreamConfig>
where
    R: Fn(&str) -> Option<String>,
{
    let rest_source = read(env::UPSTREAM_REST_URL)
        .map(|value| (env::UPSTREAM_REST_URL, value))
        .or_else(|| {
            read(env::UPSTREAM_REST_URL_LEGACY).map(|value| (env::UPSTREAM_REST_URL_LEGACY, value))
        });
    let rest_base = rest_source
        .map(|(field, value)| parse_http_url(field, &value))
        .transpose()?;

    let graphql_url = match read(env::UPSTREAM_GRAPHQL_URL) {
        Some(value) => Some(parse_http_url(env::UPSTREAM_GRAPHQL_URL, &value)?),
        None => rest_base
            .as_ref()
            .map(|base| join_path(env::UPSTREAM_REST_URL, base, DEFAULT_GRAPHQL_PATH))
            .transpose()?,
    };

    let products_path =
        read(env::IMPORT_PRODUCTS_PATH).unwrap_or_else(|| DEFAULT_IMPORT_PRODUCTS_PATH.to_string());
    let jobs_path = read(env::IMPORT_USER_JOBS_PATH)
        .unwrap_or_else(|| DEFAULT_IMPORT_USER_JOBS_PATH.to_string());
    let import_products_url = rest_base
        .as_ref()
        .map(|base| join_path(env::IMPORT_PRODUCTS_PATH, base, &products_path))
        .transpose()?;
    let import_user_jobs_url = rest_base
        .as_ref()
        .map(|base| join_path(env::IMPORT_USER_JOBS_PATH, base, &jobs_path))
        .transpose()?;

    let timeout = read(env::UPSTREAM_TIMEOUT_SECS)
        .map(|value| parse_timeout_secs(env::UPSTREAM_TIMEOUT_SECS, &value))
        .transpose()?
        .flatten();

    if rest_base.is_none() {
        warn!("upstream REST base URL is not configured; import endpoints will fail");
    }
    if graphql_url.is_none() {
        warn!("upstream GraphQL URL is not configured; graphql proxy will fail");
    }
    debug!(
        graphql_configured = graphql_url.is_some(),
        rest_configured = rest_base.is_some(),
        timeout_secs = timeout.map(|value| value.as_secs()),
        "loaded upstream configuration"
    );

    Ok(UpstreamConfig {
        rest_base,
        graphql_url,
        import_products_url,
        import_user_jobs_url,
        store_code: read(env::STORE_CODE),
        timeout,
    })
}
