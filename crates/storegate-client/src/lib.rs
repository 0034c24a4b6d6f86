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

//! Dashboard-side client for the Storegate proxy.
//!
//! Layout: `client.rs` (HTTP client and proxy calls), `models.rs` (request and
//! response envelopes), `error.rs` (error types).

pub mod client;
pub mod error;
pub mod models;

pub use client::GraphqlClient;
pub use error::{ClientError, ClientResult};
pub use models::{GraphqlRequest, ImportProductsRequest};
