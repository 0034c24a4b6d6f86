//! Error types for proxy client calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced to dashboard callers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The proxy base URL could not be parsed or joined.
    #[error("invalid proxy url")]
    InvalidUrl {
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build http client")]
    Build {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// A multipart part could not be assembled.
    #[error("invalid upload part")]
    Multipart {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The GraphQL response carried application errors.
    #[error("{message}")]
    Graphql {
        /// First error message returned by the upstream.
        message: String,
    },
    /// The proxy answered with a failure that carried no GraphQL error.
    #[error("proxy error")]
    Proxy {
        /// Status returned by the proxy.
        status: StatusCode,
    },
    /// The proxy could not be reached.
    #[error("request to proxy failed")]
    Transport {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
}

/// Convenience alias for client results.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphql_errors_surface_the_upstream_message() {
        let err = ClientError::Graphql {
            message: "The account sign-in was incorrect.".to_string(),
        };
        assert_eq!(err.to_string(), "The account sign-in was incorrect.");

        let proxy = ClientError::Proxy {
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(proxy.to_string(), "proxy error");
    }
}
