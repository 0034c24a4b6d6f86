//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment value could not be parsed.
    #[error("invalid configuration value")]
    InvalidValue {
        /// Environment variable that carried the value.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// An environment value was not a usable URL.
    #[error("invalid upstream url")]
    InvalidUrl {
        /// Environment variable that carried the value.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Underlying URL parse error.
        source: url::ParseError,
    },
}

impl ConfigError {
    /// Name of the environment variable tied to the failure.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidValue { field, .. } | Self::InvalidUrl { field, .. } => field,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_error_messages_are_constant() {
        let invalid = ConfigError::InvalidValue {
            field: "STOREGATE_HTTP_PORT",
            value: "abc".to_string(),
            reason: "not_a_port",
        };
        assert_eq!(invalid.to_string(), "invalid configuration value");
        assert_eq!(invalid.field(), "STOREGATE_HTTP_PORT");
        assert!(invalid.source().is_none());

        let url = ConfigError::InvalidUrl {
            field: "STOREGATE_UPSTREAM_REST_URL",
            value: "::".to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        assert_eq!(url.to_string(), "invalid upstream url");
        assert!(url.source().is_some());
    }
}
