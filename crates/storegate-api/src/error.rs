//! # Design
//!
//! - Provide a single crate-level error type for proxy bootstrap/serve failures.
//! - Keep error messages constant; capture operational context in structured fields.
//! - Preserve sources for diagnostics without double-logging.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::net::SocketAddr;

/// Result alias for API server operations.
pub type ApiServerResult<T> = std::result::Result<T, ApiServerError>;

/// Errors raised while bootstrapping or serving the proxy.
#[derive(Debug)]
pub enum ApiServerError {
    /// Building the upstream HTTP client failed.
    HttpClient {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// A configured value cannot be sent as an HTTP header.
    InvalidHeader {
        /// Header the value was destined for.
        name: &'static str,
        /// Underlying header validation error.
        source: axum::http::header::InvalidHeaderValue,
    },
    /// Binding the listener failed.
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Serving failed.
    Serve {
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl Display for ApiServerError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpClient { .. } => formatter.write_str("failed to build upstream http client"),
            Self::InvalidHeader { .. } => {
                formatter.write_str("configured value is not a valid header value")
            }
            Self::Bind { .. } => formatter.write_str("failed to bind api listener"),
            Self::Serve { .. } => formatter.write_str("api server terminated unexpectedly"),
        }
    }
}

impl Error for ApiServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::HttpClient { source } => Some(source),
            Self::InvalidHeader { source, .. } => Some(source),
            Self::Bind { source, .. } | Self::Serve { source } => Some(source),
        }
    }
}
