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

//! Environment-sourced configuration for the Storegate proxy.
//!
//! Layout: `model.rs` (typed config models), `loader.rs` (environment lookup
//! with fallbacks), `validate.rs` (parsing helpers), `defaults.rs` (fallback
//! values), `error.rs` (error types).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{ProxyConfig, UpstreamConfig};
