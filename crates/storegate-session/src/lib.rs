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

//! Client-side session primitives: the in-memory token cell and the
//! passphrase-keyed codec that protects the token at rest.
//!
//! Layout: `token.rs` (shared token cell), `codec.rs` (key derivation and
//! AEAD envelope), `storage.rs` (session storage seam), `secure.rs`
//! (encrypted storage entry), `manager.rs` (login/restore/logout lifecycle),
//! `error.rs` (error types).

pub mod codec;
pub mod error;
pub mod manager;
pub mod secure;
pub mod storage;
pub mod token;

pub use codec::{ENVELOPE_PREFIX, decrypt_string, encrypt_string, is_enveloped};
pub use error::{SessionError, SessionResult};
pub use manager::SessionManager;
pub use secure::{STORAGE_KEY, SecureSession};
pub use storage::{MemorySessionStorage, SessionStorage};
pub use token::TokenCell;
