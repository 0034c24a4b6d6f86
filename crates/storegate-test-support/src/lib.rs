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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (credential and payload samples), upstream.rs (recording mock upstream server).

pub mod fixtures;
pub mod upstream;

pub use upstream::{MockResponse, MockUpstream, RecordedRequest};
