//! HTTP surface modules (router, proxy handlers, shared helpers).

/// Shared constants and header names for HTTP surfaces.
pub(crate) mod constants;
/// Authorization header and cookie normalisation plus credential selection.
pub mod credentials;
/// Problem response helpers and error types.
pub mod errors;
/// Upstream pass-through, preflight and body buffering helpers.
pub(crate) mod forward;
/// GraphQL proxy handler.
pub(crate) mod graphql;
/// Health and diagnostics endpoints.
pub(crate) mod health;
/// REST import proxy handlers.
pub(crate) mod imports;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub(crate) mod telemetry;
