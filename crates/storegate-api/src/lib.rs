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

//! Storefront dashboard proxy: relays GraphQL and REST import traffic to the
//! upstream commerce backend, choosing which credential each call carries.
//!
//! Layout: `http/router.rs` (server host), `http/graphql.rs` and
//! `http/imports.rs` (proxy handlers), `http/credentials.rs` (header
//! sanitizer and credential policy), `http/forward.rs` (upstream
//! pass-through), `state.rs` (shared handler state), `error.rs` (error types).

pub mod error;
pub mod http;
pub(crate) mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::credentials::{
    Credential, CredentialOrigin, CredentialShape, looks_encrypted, sanitize_authorization,
    sanitize_header_value,
};
pub use http::errors::ProblemDetails;
pub use http::router::ApiServer;
