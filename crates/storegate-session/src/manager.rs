//! Login lifecycle joining the token cell and the encrypted session entry.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SessionResult;
use crate::secure::SecureSession;
use crate::storage::SessionStorage;
use crate::token::TokenCell;

/// Keeps the in-memory token and its encrypted copy in step.
pub struct SessionManager<S> {
    session: SecureSession<S>,
    cell: Arc<TokenCell>,
    passphrase: String,
}

impl<S: SessionStorage> SessionManager<S> {
    /// Build a manager over `storage`, publishing into `cell`.
    pub fn new(storage: S, cell: Arc<TokenCell>, passphrase: impl Into<String>) -> Self {
        Self {
            session: SecureSession::new(storage),
            cell,
            passphrase: passphrase.into(),
        }
    }

    /// Token cell this manager publishes into.
    #[must_use]
    pub fn token_cell(&self) -> Arc<TokenCell> {
        Arc::clone(&self.cell)
    }

    /// Persist `token` encrypted and make it the current token.
    ///
    /// # Errors
    ///
    /// Returns the codec error if the token cannot be encrypted; the cell is
    /// left untouched in that case.
    pub fn login(&self, token: &str) -> SessionResult<()> {
        self.session
            .set_encrypted_token(token, Some(&self.passphrase))?;
        self.cell.set_auth_token(Some(token));
        info!("session established");
        Ok(())
    }

    /// Load the stored token into the cell.
    ///
    /// A stored entry that cannot be decrypted is discarded and the session
    /// is treated as logged out.
    pub fn restore(&self) -> Option<String> {
        match self.session.get_encrypted_token(Some(&self.passphrase)) {
            Ok(Some(token)) => {
                self.cell.set_auth_token(Some(&token));
                debug!("session restored from storage");
                Some(token)
            }
            Ok(None) => {
                self.cell.clear_auth_token();
                None
            }
            Err(_) => {
                self.logout();
                None
            }
        }
    }

    /// Drop the stored token and clear the cell.
    pub fn logout(&self) {
        self.session.remove_encrypted_token();
        self.cell.clear_auth_token();
        debug!("session cleared");
    }
}
