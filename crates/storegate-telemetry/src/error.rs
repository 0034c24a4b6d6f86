//! Error types for telemetry setup and metrics exposition.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::init::LogFormat;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Step of collector setup that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStage {
    /// Building the collector from its options.
    Build,
    /// Adding the collector to the registry.
    Register,
}

impl CollectorStage {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Register => "register",
        }
    }
}

/// Errors raised by telemetry helpers.
#[derive(Debug)]
pub enum TelemetryError {
    /// A global log subscriber was already installed or could not be set.
    SubscriberInstall {
        /// Output format that was being installed.
        format: LogFormat,
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// A proxy counter could not be set up.
    Collector {
        /// Metric name tied to the failure.
        metric: &'static str,
        /// Setup step that failed.
        stage: CollectorStage,
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// The `/metrics` exposition could not be rendered.
    Render {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::SubscriberInstall { .. } => "log subscriber installation failed",
            Self::Collector { .. } => "proxy metric setup failed",
            Self::Render { .. } => "metrics exposition failed",
        };
        formatter.write_str(message)
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source, .. } => Some(source),
            Self::Collector { source, .. } | Self::Render { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_failures_keep_metric_and_stage() {
        let err = TelemetryError::Collector {
            metric: "upstream_requests_total",
            stage: CollectorStage::Register,
            source: prometheus::Error::AlreadyReg,
        };
        assert_eq!(err.to_string(), "proxy metric setup failed");
        assert!(err.source().is_some());
        assert!(matches!(
            err,
            TelemetryError::Collector {
                metric: "upstream_requests_total",
                stage: CollectorStage::Register,
                ..
            }
        ));
        assert_eq!(CollectorStage::Build.as_str(), "build");
    }

    #[test]
    fn render_failure_message_is_constant() {
        let err = TelemetryError::Render {
            source: prometheus::Error::Msg("bad label".to_string()),
        };
        assert_eq!(err.to_string(), "metrics exposition failed");
        assert!(err.source().is_some());
    }
}
