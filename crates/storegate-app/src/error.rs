//! # Design
//!
//! - Centralize application-level errors raised while bootstrapping the proxy.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: storegate_config::ConfigError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: storegate_api::ApiServerError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: storegate_telemetry::TelemetryError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: storegate_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: storegate_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: storegate_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    /// Operation label attached to the failure.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Config { operation, .. }
            | Self::ApiServer { operation, .. }
            | Self::Telemetry { operation, .. } => operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config.load",
            storegate_config::ConfigError::InvalidValue {
                field: "STOREGATE_HTTP_PORT",
                value: "http".to_string(),
                reason: "not_a_port",
            },
        );
        assert!(matches!(config, AppError::Config { .. }));
        assert_eq!(config.operation(), "config.load");
        assert_eq!(config.to_string(), "configuration operation failed");

        let api = AppError::api_server(
            "api_server.serve",
            storegate_api::ApiServerError::Serve {
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));
        assert!(api.source().is_some());

        let telemetry = AppError::telemetry(
            "telemetry.metrics",
            storegate_telemetry::TelemetryError::Collector {
                metric: "http_requests_total",
                stage: storegate_telemetry::CollectorStage::Register,
                source: prometheus::Error::AlreadyReg,
            },
        );
        assert_eq!(telemetry.operation(), "telemetry.metrics");
        assert!(telemetry.source().is_some());
    }
}
