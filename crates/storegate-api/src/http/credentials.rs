//! Credential normalisation and selection for proxied requests.
//!
//! # Design
//! - Browsers deliver the bearer token in several malformed shapes (quoted,
//!   double-quoted after the scheme, bare JWT, wrong scheme word); every shape
//!   is folded into `Bearer <token>` or passed through when opaque.
//! - Encrypted session blobs must never reach the upstream as a credential
//!   when a plain JWT is available in the `accessToken` cookie.
//! - Values are only ever logged by origin and shape, never by content.

use std::borrow::Cow;

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION, header::COOKIE};
use storegate_session::is_enveloped;
use storegate_telemetry::CredentialSource;

use crate::http::constants::{COOKIE_ACCESS_TOKEN, ENCRYPTED_MIN_LEN, LOGIN_OPERATIONS};

const BEARER: &str = "bearer";

/// Where a candidate credential was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// The `Authorization` request header.
    Header,
    /// The `accessToken` cookie.
    Cookie,
}

/// Coarse classification of a credential value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialShape {
    /// Three dot-separated segments.
    Jwt,
    /// Tagged envelope or long base64 blob.
    Encrypted,
    /// Anything else.
    Opaque,
}

impl CredentialShape {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jwt => "jwt",
            Self::Encrypted => "encrypted",
            Self::Opaque => "opaque",
        }
    }
}

/// A sanitized credential together with its origin.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    origin: CredentialOrigin,
    value: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Credential")
            .field("origin", &self.origin)
            .field("shape", &self.shape())
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Sanitize `raw` and wrap it; `None` when nothing usable remains.
    #[must_use]
    pub fn new(origin: CredentialOrigin, raw: &str) -> Option<Self> {
        sanitize_authorization(Some(raw)).map(|value| Self { origin, value })
    }

    /// Where the credential came from.
    #[must_use]
    pub const fn origin(&self) -> CredentialOrigin {
        self.origin
    }

    /// Sanitized header value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Classification of the value.
    #[must_use]
    pub fn shape(&self) -> CredentialShape {
        if looks_encrypted(&self.value) {
            CredentialShape::Encrypted
        } else if is_jwt_shaped(strip_scheme(&self.value)) {
            CredentialShape::Jwt
        } else {
            CredentialShape::Opaque
        }
    }
}

/// Outcome of credential selection for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Credential to forward, if any.
    pub credential: Option<Credential>,
    /// Metric label describing the decision.
    pub source: CredentialSource,
}

/// Normalise an `Authorization` header or cookie value.
///
/// Returns `Some("Bearer <token>")` for bearer and JWT-shaped input, the
/// value unchanged for opaque input, and `None` when nothing usable remains.
#[must_use]
pub fn sanitize_authorization(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(token) = bearer_token(trimmed) {
        return canonical_bearer(token);
    }

    let unquoted = strip_outer_quotes(trimmed).trim();
    if unquoted.is_empty() {
        return None;
    }
    if let Some(token) = bearer_token(unquoted) {
        return canonical_bearer(token);
    }

    let candidate = strip_scheme(unquoted);
    if is_jwt_shaped(candidate) {
        return Some(format!("Bearer {candidate}"));
    }
    Some(unquoted.to_string())
}

/// [`sanitize_authorization`] over a raw header; non-UTF-8 bytes yield `None`.
#[must_use]
pub fn sanitize_header_value(value: &HeaderValue) -> Option<String> {
    sanitize_authorization(value.to_str().ok())
}

/// Whether `value` looks like an encrypted session blob rather than a token
/// the upstream understands.
#[must_use]
pub fn looks_encrypted(value: &str) -> bool {
    let bare = strip_outer_quotes(value.trim()).trim();
    let bare = bearer_token(bare).unwrap_or(bare);
    let bare = strip_outer_quotes(bare).trim();
    if is_enveloped(bare) {
        return true;
    }
    if is_jwt_shaped(bare) || bare.len() < ENCRYPTED_MIN_LEN {
        return false;
    }
    bare.chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '/' | '='))
}

/// Whether `operation` belongs to the login family.
#[must_use]
pub fn is_login_operation(operation: Option<&str>) -> bool {
    operation.is_some_and(|name| LOGIN_OPERATIONS.contains(&name))
}

/// Sanitized `Authorization` header candidate.
#[must_use]
pub fn header_credential(headers: &HeaderMap) -> Option<Credential> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    Credential::new(CredentialOrigin::Header, raw)
}

/// Sanitized `accessToken` cookie candidate.
#[must_use]
pub fn cookie_credential(headers: &HeaderMap) -> Option<Credential> {
    let raw = access_token_cookie(headers)?;
    Credential::new(CredentialOrigin::Cookie, &raw)
}

/// URL-decoded `accessToken` cookie value; the raw value is kept when it
/// does not decode.
#[must_use]
pub fn access_token_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == COOKIE_ACCESS_TOKEN).then(|| decode_cookie(value.trim()))
        })
}

/// Pick the credential to forward upstream.
///
/// Login-family operations never carry one. An encrypted header loses to a
/// plain cookie; otherwise the header wins over the cookie.
#[must_use]
pub fn resolve_credential(
    login_operation: bool,
    header: Option<Credential>,
    cookie: Option<Credential>,
) -> Resolution {
    if login_operation {
        let source = if header.is_some() || cookie.is_some() {
            CredentialSource::Suppressed
        } else {
            CredentialSource::None
        };
        return Resolution {
            credential: None,
            source,
        };
    }

    let header_encrypted = header
        .as_ref()
        .is_some_and(|credential| looks_encrypted(credential.value()));
    let cookie_plain = cookie
        .as_ref()
        .is_some_and(|credential| !looks_encrypted(credential.value()));
    let credential = if header_encrypted && cookie_plain {
        cookie
    } else {
        header.or(cookie)
    };
    let source = match credential.as_ref().map(Credential::origin) {
        Some(CredentialOrigin::Header) => CredentialSource::Header,
        Some(CredentialOrigin::Cookie) => CredentialSource::Cookie,
        None => CredentialSource::None,
    };
    Resolution { credential, source }
}

/// Token following a case-insensitive `Bearer` scheme; empty for a bare scheme.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_at_checked(BEARER.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return None;
    }
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

fn canonical_bearer(token: &str) -> Option<String> {
    let token = strip_outer_quotes(token).trim();
    (!token.is_empty()).then(|| format!("Bearer {token}"))
}

fn strip_outer_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// Drop a leading scheme word, if any.
fn strip_scheme(value: &str) -> &str {
    value
        .split_once(char::is_whitespace)
        .map_or(value, |(_, rest)| rest.trim())
}

fn is_jwt_shaped(value: &str) -> bool {
    let mut segments = 0;
    for segment in value.split('.') {
        if segment.is_empty() || segment.contains(char::is_whitespace) {
            return false;
        }
        segments += 1;
    }
    segments == 3
}

fn decode_cookie(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}
