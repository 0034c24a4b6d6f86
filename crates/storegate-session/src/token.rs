//! Shared holder for the current bearer token.
//!
//! # Design
//! - Owned by whoever needs it and shared through `Arc`; there is no global.
//! - Writes replace the value wholesale, so concurrent writers resolve to
//!   last-write-wins.

use std::sync::{PoisonError, RwLock};

/// In-memory cell holding the bearer token of the signed-in user.
#[derive(Debug, Default)]
pub struct TokenCell {
    current: RwLock<Option<String>>,
}

impl TokenCell {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell that already holds `token`.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let cell = Self::new();
        cell.set_auth_token(Some(token));
        cell
    }

    /// Store `token`, or clear the cell when it is `None` or empty.
    ///
    /// The value is stored as given; whitespace is not trimmed or rejected.
    pub fn set_auth_token(&self, token: Option<&str>) {
        let next = token.filter(|value| !value.is_empty()).map(str::to_string);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Current token, if any.
    #[must_use]
    pub fn get_auth_token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the current token.
    pub fn clear_auth_token(&self) {
        self.set_auth_token(None);
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn set_get_and_clear() {
        let cell = TokenCell::new();
        assert_eq!(cell.get_auth_token(), None);

        cell.set_auth_token(Some("abc.def.ghi"));
        assert_eq!(cell.get_auth_token().as_deref(), Some("abc.def.ghi"));
        assert!(cell.is_authenticated());

        cell.clear_auth_token();
        assert_eq!(cell.get_auth_token(), None);
    }

    #[test]
    fn only_empty_or_absent_tokens_clear_the_cell() {
        let cell = TokenCell::with_token("opaque");
        cell.set_auth_token(Some("   "));
        assert_eq!(cell.get_auth_token().as_deref(), Some("   "));

        cell.set_auth_token(Some(""));
        assert!(!cell.is_authenticated());

        cell.set_auth_token(Some("opaque"));
        cell.set_auth_token(None);
        assert!(!cell.is_authenticated());
    }

    #[test]
    fn writes_from_other_threads_are_visible() -> Result<(), String> {
        let cell = Arc::new(TokenCell::new());
        let writer = {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || cell.set_auth_token(Some("from-thread")))
        };
        writer.join().map_err(|_| "writer panicked".to_string())?;
        assert_eq!(cell.get_auth_token().as_deref(), Some("from-thread"));
        Ok(())
    }
}
