//! Parsing helpers for environment-sourced configuration values.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse a listener address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is not an IP address.
pub fn parse_bind_addr(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    IpAddr::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
        field,
        value: value.to_string(),
        reason: "not_an_ip_address",
    })
}

/// Parse a non-zero TCP port.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is not a port or is zero.
pub fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port = value
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "not_a_port",
        })?;
    if port == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "zero",
        });
    }
    Ok(port)
}

/// Parse a strictly positive byte count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is not a positive integer.
pub fn parse_byte_limit(field: &'static str, value: &str) -> ConfigResult<usize> {
    match value.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "not_a_positive_integer",
        }),
    }
}

/// Parse an optional timeout in whole seconds; `0` disables the timeout.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is not an integer.
pub fn parse_timeout_secs(field: &'static str, value: &str) -> ConfigResult<Option<Duration>> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "not_an_integer",
        })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Parse an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when parsing fails and
/// [`ConfigError::InvalidValue`] for non-HTTP schemes.
pub fn parse_http_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let trimmed = value.trim();
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason: "unsupported_scheme",
        });
    }
    Ok(url)
}

/// Normalise an upstream path so it always begins with a single `/`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

/// Append `path` to `base`, keeping any path prefix already present on the base.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] if the joined value is not a valid URL.
pub fn join_path(field: &'static str, base: &Url, path: &str) -> ConfigResult<Url> {
    let joined = format!(
        "{}{}",
        base.as_str().trim_end_matches('/'),
        normalize_path(path)
    );
    Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: joined,
        source,
    })
}
