//! Encrypted session entry on top of a [`SessionStorage`].
//!
//! # Design
//! - One fixed storage key; the stored value is always an `enc:v1:` envelope.
//! - Read failures are returned as errors and logged, never panicked on.
//!   Callers treat any error as "no valid session".

use tracing::warn;

use crate::codec::{decrypt_string, encrypt_string};
use crate::error::{SessionError, SessionResult};
use crate::storage::SessionStorage;

/// Storage key holding the encrypted token.
pub const STORAGE_KEY: &str = "storegate.session.token";

/// Passphrase-protected token entry in session storage.
#[derive(Debug)]
pub struct SecureSession<S> {
    storage: S,
}

impl<S: SessionStorage> SecureSession<S> {
    /// Wrap `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Encrypt `token` and store it under [`STORAGE_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingPassphrase`] when `passphrase` is absent
    /// or empty, or the codec error if encryption fails.
    pub fn set_encrypted_token(&self, token: &str, passphrase: Option<&str>) -> SessionResult<()> {
        let passphrase = require_passphrase(passphrase)?;
        let blob = encrypt_string(token, passphrase)?;
        self.storage.set_item(STORAGE_KEY, blob);
        Ok(())
    }

    /// Decrypt the stored token.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing passphrase, corrupt data, or a wrong
    /// passphrase. The failure is logged at `warn`.
    pub fn get_encrypted_token(&self, passphrase: Option<&str>) -> SessionResult<Option<String>> {
        let Some(blob) = self.storage.get_item(STORAGE_KEY) else {
            return Ok(None);
        };
        require_passphrase(passphrase)
            .and_then(|passphrase| decrypt_string(&blob, passphrase))
            .map(Some)
            .inspect_err(|err| warn!(error = %err, "failed to decrypt stored session token"))
    }

    /// Delete the stored token.
    pub fn remove_encrypted_token(&self) {
        self.storage.remove_item(STORAGE_KEY);
    }
}

fn require_passphrase(passphrase: Option<&str>) -> SessionResult<&str> {
    passphrase
        .filter(|value| !value.is_empty())
        .ok_or(SessionError::MissingPassphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ENVELOPE_PREFIX;
    use crate::storage::MemorySessionStorage;

    #[test]
    fn stored_token_round_trips() -> SessionResult<()> {
        let session = SecureSession::new(MemorySessionStorage::new());
        assert_eq!(session.get_encrypted_token(Some("pass"))?, None);

        session.set_encrypted_token("abc.def.ghi", Some("pass"))?;
        let stored = session.storage().get_item(STORAGE_KEY);
        assert!(stored.is_some_and(|blob| blob.starts_with(ENVELOPE_PREFIX)));
        assert_eq!(
            session.get_encrypted_token(Some("pass"))?.as_deref(),
            Some("abc.def.ghi")
        );

        session.remove_encrypted_token();
        assert_eq!(session.get_encrypted_token(Some("pass"))?, None);
        Ok(())
    }

    #[test]
    fn repeated_writes_store_different_blobs() -> SessionResult<()> {
        let session = SecureSession::new(MemorySessionStorage::new());
        session.set_encrypted_token("token", Some("pass"))?;
        let first = session.storage().get_item(STORAGE_KEY);
        session.set_encrypted_token("token", Some("pass"))?;
        let second = session.storage().get_item(STORAGE_KEY);
        assert!(first.is_some());
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn wrong_or_missing_passphrase_is_an_error() -> SessionResult<()> {
        let session = SecureSession::new(MemorySessionStorage::new());
        session.set_encrypted_token("token", Some("right"))?;
        assert!(matches!(
            session.get_encrypted_token(Some("wrong")),
            Err(SessionError::Decrypt)
        ));
        assert!(matches!(
            session.get_encrypted_token(None),
            Err(SessionError::MissingPassphrase)
        ));
        assert!(matches!(
            session.set_encrypted_token("token", Some("")),
            Err(SessionError::MissingPassphrase)
        ));
        Ok(())
    }

    #[test]
    fn corrupt_entry_is_an_error() {
        let storage = MemorySessionStorage::new();
        storage.set_item(STORAGE_KEY, "enc:v1:%%%".to_string());
        let session = SecureSession::new(storage);
        assert!(matches!(
            session.get_encrypted_token(Some("pass")),
            Err(SessionError::Decode { .. })
        ));
    }
}
