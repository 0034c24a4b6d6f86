//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes counters for proxied traffic, upstream outcomes, and credential
//!   resolution so operators can spot login carve-outs and cookie fallbacks.

use std::sync::Arc;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CollectorStage, Result, TelemetryError};

/// Which credential the GraphQL proxy ended up forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The sanitized `Authorization` header.
    Header,
    /// The sanitized `accessToken` cookie.
    Cookie,
    /// Nothing usable was supplied.
    None,
    /// A credential was supplied but withheld for a login-family operation.
    Suppressed,
}

impl CredentialSource {
    /// Label value recorded on the metric.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::None => "none",
            Self::Suppressed => "suppressed",
        }
    }
}

/// Outcome of a single upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// Upstream answered with a 2xx status.
    Success,
    /// Upstream answered with a non-2xx status (relayed verbatim).
    ErrorStatus,
    /// No upstream response was obtained.
    TransportFailure,
}

impl UpstreamOutcome {
    /// Label value recorded on the metric.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ErrorStatus => "error_status",
            Self::TransportFailure => "transport_failure",
        }
    }
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    upstream_requests_total: IntCounterVec,
    credential_resolutions_total: IntCounterVec,
    upstream_failures_total: IntCounter,
}

/// Snapshot of selected counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Upstream calls that produced no response.
    pub upstream_failures_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let upstream_requests_total = counter_vec(
            "upstream_requests_total",
            "Upstream calls issued by the proxy, by target and outcome",
            &["target", "outcome"],
        )?;
        let credential_resolutions_total = counter_vec(
            "credential_resolutions_total",
            "GraphQL proxy credential decisions by source",
            &["source"],
        )?;
        let upstream_failures_total = IntCounter::with_opts(Opts::new(
            "upstream_failures_total",
            "Upstream calls that produced no response",
        ))
        .map_err(|source| TelemetryError::Collector {
            metric: "upstream_failures_total",
            stage: CollectorStage::Build,
            source,
        })?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "upstream_requests_total", &upstream_requests_total)?;
        register(
            &registry,
            "credential_resolutions_total",
            &credential_resolutions_total,
        )?;
        register(&registry, "upstream_failures_total", &upstream_failures_total)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                upstream_requests_total,
                credential_resolutions_total,
                upstream_failures_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Record the outcome of an upstream call for the named target.
    pub fn inc_upstream_request(&self, target: &str, outcome: UpstreamOutcome) {
        self.inner
            .upstream_requests_total
            .with_label_values(&[target, outcome.as_str()])
            .inc();
        if outcome == UpstreamOutcome::TransportFailure {
            self.inner.upstream_failures_total.inc();
        }
    }

    /// Record which credential source the GraphQL proxy resolved.
    pub fn inc_credential_resolution(&self, source: CredentialSource) {
        self.inner
            .credential_resolutions_total
            .with_label_values(&[source.as_str()])
            .inc();
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the gathered families cannot be encoded.
    pub fn render(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.inner.registry.gather())
            .map_err(|source| TelemetryError::Render { source })
    }

    /// Take a point-in-time snapshot of the most relevant counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            upstream_failures_total: self.inner.upstream_failures_total.get(),
        }
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::Collector {
            metric: name,
            stage: CollectorStage::Build,
            source,
        })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::Collector {
            metric: name,
            stage: CollectorStage::Register,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_render_includes_recorded_series() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/api/graphql-proxy", 200);
        metrics.inc_upstream_request("graphql", UpstreamOutcome::Success);
        metrics.inc_credential_resolution(CredentialSource::Suppressed);

        let rendered = metrics.render()?;
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("route=\"/api/graphql-proxy\""));
        assert!(rendered.contains("outcome=\"success\""));
        assert!(rendered.contains("source=\"suppressed\""));
        Ok(())
    }

    #[test]
    fn transport_failures_feed_the_snapshot() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_upstream_request("import_products", UpstreamOutcome::ErrorStatus);
        assert_eq!(metrics.snapshot().upstream_failures_total, 0);

        metrics.inc_upstream_request("import_products", UpstreamOutcome::TransportFailure);
        metrics.inc_upstream_request("graphql", UpstreamOutcome::TransportFailure);
        assert_eq!(metrics.snapshot().upstream_failures_total, 2);
        Ok(())
    }

    #[test]
    fn label_values_are_stable() {
        assert_eq!(CredentialSource::Header.as_str(), "header");
        assert_eq!(CredentialSource::Cookie.as_str(), "cookie");
        assert_eq!(CredentialSource::None.as_str(), "none");
        assert_eq!(UpstreamOutcome::ErrorStatus.as_str(), "error_status");
    }
}
