//! `/api/graphql-proxy`: single ingress for dashboard GraphQL traffic.
//!
//! # Design
//! - The request body is forwarded untouched; it is only parsed to find the
//!   operation name.
//! - An explicit `operationName` in the envelope names the operation for logs;
//!   otherwise the first `query <Name>` / `mutation <Name>` of the document does.
//! - A request is login-family when either the explicit name or the document's
//!   own name is. Login-family calls are sent without any credential so a stale
//!   or foreign token cannot leak into the authentication call, whatever the
//!   envelope claims.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::Response,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::http::constants::{HEADER_STORE, TARGET_GRAPHQL};
use crate::http::credentials::{
    Credential, cookie_credential, header_credential, is_login_operation, resolve_credential,
};
use crate::http::errors::ApiError;
use crate::http::forward::{ForwardOptions, UpstreamRequest, buffer_body, preflight};
use crate::state::ApiState;

const ALLOWED: &[Method] = &[Method::POST];

static OPERATION_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\b(?:query|mutation)\s+([_A-Za-z][_0-9A-Za-z]*)").ok());

#[derive(Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    query: Option<String>,
    #[serde(default, rename = "operationName")]
    operation_name: Option<String>,
}

pub(crate) async fn graphql_proxy(
    State(state): State<Arc<ApiState>>,
    request: Request,
) -> Result<Response, ApiError> {
    match *request.method() {
        Method::OPTIONS => return Ok(preflight(ALLOWED)),
        Method::POST => {}
        _ => return Err(ApiError::method_not_allowed(ALLOWED)),
    }
    let Some(url) = state.upstream.graphql_url.clone() else {
        error!("graphql upstream url is not configured");
        return Err(ApiError::upstream_not_configured());
    };

    let (parts, body) = request.into_parts();
    let body = buffer_body(body, state.max_upload_bytes).await?;
    let operation = OperationNames::from_body(&body);
    let resolution = resolve_credential(
        operation.is_login(),
        header_credential(&parts.headers),
        cookie_credential(&parts.headers),
    );
    state.telemetry.inc_credential_resolution(resolution.source);
    debug!(
        operation = operation.primary().unwrap_or_default(),
        credential_source = resolution.source.as_str(),
        credential_shape = resolution
            .credential
            .as_ref()
            .map(|credential| credential.shape().as_str()),
        "resolved graphql credential"
    );

    let headers = upstream_headers(
        state.store_header.as_ref(),
        resolution.credential.as_ref(),
    );
    state
        .forwarder
        .forward(
            UpstreamRequest {
                target: TARGET_GRAPHQL,
                method: Method::POST,
                url,
                headers,
                body: Some(body),
            },
            ForwardOptions::default(),
        )
        .await
}

/// Operation names declared by a GraphQL request body.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct OperationNames {
    explicit: Option<String>,
    scanned: Option<String>,
}

impl OperationNames {
    pub(crate) fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<GraphqlEnvelope>(body) {
            Ok(envelope) => Self {
                explicit: envelope
                    .operation_name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty()),
                scanned: envelope.query.as_deref().and_then(scan_document),
            },
            Err(_) => Self {
                explicit: None,
                scanned: scan_document(&String::from_utf8_lossy(body)),
            },
        }
    }

    /// Name used for logging; the explicit `operationName` wins.
    pub(crate) fn primary(&self) -> Option<&str> {
        self.explicit.as_deref().or(self.scanned.as_deref())
    }

    pub(crate) fn is_login(&self) -> bool {
        is_login_operation(self.explicit.as_deref()) || is_login_operation(self.scanned.as_deref())
    }
}

fn scan_document(document: &str) -> Option<String> {
    OPERATION_PATTERN
        .as_ref()?
        .captures(document)?
        .get(1)
        .map(|name| name.as_str().to_string())
}

fn upstream_headers(store: Option<&HeaderValue>, credential: Option<&Credential>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(store) = store {
        headers.insert(HeaderName::from_static(HEADER_STORE), store.clone());
    }
    if let Some(credential) = credential {
        match HeaderValue::from_str(credential.value()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!(
                origin = ?credential.origin(),
                "resolved credential is not a valid header value; forwarding without it"
            ),
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::credentials::CredentialOrigin;

    #[test]
    fn operation_name_prefers_the_envelope_field() {
        let body = br#"{"query":"query Products { products { items { sku } } }","operationName":"ValidateOTP"}"#;
        assert_eq!(OperationNames::from_body(body).primary(), Some("ValidateOTP"));
    }

    #[test]
    fn operation_name_scans_the_document() {
        let body = br#"{"query":"mutation GenerateCustomerToken($email: String!) { x }"}"#;
        assert_eq!(OperationNames::from_body(body).primary(), Some("GenerateCustomerToken"));

        let blank_name = br#"{"query":"query Cart { cart }","operationName":"  "}"#;
        assert_eq!(OperationNames::from_body(blank_name).primary(), Some("Cart"));
    }

    #[test]
    fn operation_name_falls_back_to_raw_text() {
        assert_eq!(
            OperationNames::from_body(b"mutation ValidateOtpCode { ok").primary(),
            Some("ValidateOtpCode")
        );
        assert_eq!(
            OperationNames::from_body(br#"{"query":"{ anonymous }"}"#),
            OperationNames::default()
        );
        assert_eq!(OperationNames::from_body(b"").primary(), None);
    }

    #[test]
    fn login_document_stays_login_under_a_different_operation_name() {
        let body = br#"{"query":"mutation GenerateCustomerToken($email: String!) { generateCustomerToken(email: $email) { token } }","operationName":"Products"}"#;
        let names = OperationNames::from_body(body);
        assert_eq!(names.primary(), Some("Products"));
        assert!(names.is_login());

        let claimed = br#"{"query":"query Products { products { total_count } }","operationName":"ValidateOTP"}"#;
        assert!(OperationNames::from_body(claimed).is_login());

        let plain = br#"{"query":"query Products { products { total_count } }","operationName":"Products"}"#;
        assert!(!OperationNames::from_body(plain).is_login());
    }

    #[test]
    fn operation_name_takes_the_first_match() {
        let body = br#"{"query":"query First { a } mutation Second { b }"}"#;
        assert_eq!(OperationNames::from_body(body).primary(), Some("First"));
    }

    #[test]
    fn upstream_headers_include_store_and_credential() {
        let credential = Credential::new(CredentialOrigin::Cookie, "abc.def.ghi");
        let store = HeaderValue::from_static("default");
        let headers = upstream_headers(Some(&store), credential.as_ref());
        assert_eq!(
            headers.get(CONTENT_TYPE).map(HeaderValue::as_bytes),
            Some(&b"application/json"[..])
        );
        assert_eq!(
            headers.get(HEADER_STORE).map(HeaderValue::as_bytes),
            Some(&b"default"[..])
        );
        assert!(
            headers
                .get(AUTHORIZATION)
                .is_some_and(|value| value.is_sensitive() && value == "Bearer abc.def.ghi")
        );

        let bare = upstream_headers(None, None);
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn credentials_that_are_not_header_safe_are_dropped() {
        let credential = Credential::new(CredentialOrigin::Cookie, "abc\ndef");
        let headers = upstream_headers(None, credential.as_ref());
        assert!(headers.get(AUTHORIZATION).is_none());
    }
}
