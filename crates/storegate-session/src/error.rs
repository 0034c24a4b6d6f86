//! Error types for the session codec.

use thiserror::Error;

/// Failures raised while protecting or recovering the session token.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No passphrase (or an empty one) was supplied.
    #[error("session passphrase missing")]
    MissingPassphrase,
    /// The derived key could not initialise the cipher.
    #[error("failed to initialise session cipher")]
    Cipher,
    /// The stored blob was not valid base64.
    #[error("session blob is not valid base64")]
    Decode {
        /// Underlying base64 error.
        source: base64::DecodeError,
    },
    /// The stored blob is too short to hold an IV and an authentication tag.
    #[error("session blob is truncated")]
    Truncated {
        /// Decoded length of the blob.
        len: usize,
    },
    /// Encryption failed.
    #[error("failed to encrypt session token")]
    Encrypt,
    /// Authentication failed: wrong passphrase or tampered data.
    #[error("failed to decrypt session token")]
    Decrypt,
    /// The decrypted plaintext was not UTF-8.
    #[error("decrypted session token is not valid utf-8")]
    InvalidUtf8 {
        /// Underlying conversion error.
        source: std::string::FromUtf8Error,
    },
}

/// Convenience alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn session_errors_never_render_secret_material() {
        let cases = [
            (SessionError::MissingPassphrase, "session passphrase missing"),
            (SessionError::Truncated { len: 3 }, "session blob is truncated"),
            (SessionError::Decrypt, "failed to decrypt session token"),
        ];
        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_none());
        }

        let decode = SessionError::Decode {
            source: base64::DecodeError::InvalidLength(5),
        };
        assert!(decode.source().is_some());
    }
}
