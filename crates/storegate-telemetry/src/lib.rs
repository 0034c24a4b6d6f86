#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the Storegate workspace.
//!
//! This crate centralises logging, metrics, and request-context helpers so the
//! proxy, client, and binary adopt a consistent observability story.
//!
//! Layout: `init.rs` (subscriber setup), `context.rs` (per-request context and upstream spans),
//! `layers.rs` (request-id layer), `metrics.rs` (Prometheus registry),
//! `error.rs` (error types).

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{
    GlobalContextGuard, NO_REQUEST_ID, RequestContext, current_request_id, upstream_span,
};
pub use error::{CollectorStage, Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{REQUEST_ID_HEADER, RequestIdLayer, request_id_layer};
pub use metrics::{CredentialSource, Metrics, MetricsSnapshot, UpstreamOutcome};
