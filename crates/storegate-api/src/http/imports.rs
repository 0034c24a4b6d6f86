//! REST import pass-through routes.
//!
//! `/api/import-products` relays the raw multipart upload byte-for-byte;
//! `/api/import-user-jobs` relays the job listing. Both forward the sanitized
//! `Authorization` header and the raw `Cookie` header.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE},
    },
    response::Response,
};
use tracing::{error, warn};
use url::Url;

use crate::http::constants::{TARGET_IMPORT_PRODUCTS, TARGET_IMPORT_USER_JOBS};
use crate::http::credentials::sanitize_header_value;
use crate::http::errors::ApiError;
use crate::http::forward::{ForwardOptions, UpstreamRequest, buffer_body, preflight};
use crate::state::ApiState;

const PRODUCTS_ALLOWED: &[Method] = &[Method::POST];
const USER_JOBS_ALLOWED: &[Method] = &[Method::GET];

pub(crate) async fn import_products(
    State(state): State<Arc<ApiState>>,
    request: Request,
) -> Result<Response, ApiError> {
    match *request.method() {
        Method::OPTIONS => return Ok(preflight(PRODUCTS_ALLOWED)),
        Method::POST => {}
        _ => return Err(ApiError::method_not_allowed(PRODUCTS_ALLOWED)),
    }
    let url = configured(state.upstream.import_products_url.as_ref(), TARGET_IMPORT_PRODUCTS)?;

    let (parts, body) = request.into_parts();
    let body = buffer_body(body, state.max_upload_bytes).await?;
    let mut headers = passthrough_headers(&parts.headers);
    if let Some(content_type) = parts.headers.get(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, content_type.clone());
    }
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    state
        .forwarder
        .forward(
            UpstreamRequest {
                target: TARGET_IMPORT_PRODUCTS,
                method: Method::POST,
                url,
                headers,
                body: Some(body),
            },
            ForwardOptions::default(),
        )
        .await
}

pub(crate) async fn import_user_jobs(
    State(state): State<Arc<ApiState>>,
    request: Request,
) -> Result<Response, ApiError> {
    match *request.method() {
        Method::OPTIONS => return Ok(preflight(USER_JOBS_ALLOWED)),
        Method::GET => {}
        _ => return Err(ApiError::method_not_allowed(USER_JOBS_ALLOWED)),
    }
    let url = configured(state.upstream.import_user_jobs_url.as_ref(), TARGET_IMPORT_USER_JOBS)?;

    state
        .forwarder
        .forward(
            UpstreamRequest {
                target: TARGET_IMPORT_USER_JOBS,
                method: Method::GET,
                url,
                headers: passthrough_headers(request.headers()),
                body: None,
            },
            ForwardOptions::default(),
        )
        .await
}

fn configured(url: Option<&Url>, target: &'static str) -> Result<Url, ApiError> {
    url.cloned().ok_or_else(|| {
        error!(target_name = target, "import upstream url is not configured");
        ApiError::upstream_not_configured()
    })
}

/// Sanitized `Authorization` plus every raw `Cookie` header.
fn passthrough_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(authorization) = incoming.get(AUTHORIZATION).and_then(sanitize_header_value) {
        match HeaderValue::from_str(&authorization) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("sanitized authorization is not a valid header value; dropping it"),
        }
    }
    for cookie in incoming.get_all(COOKIE) {
        headers.append(COOKIE, cookie.clone());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_keeps_cookies_and_sanitizes_authorization() {
        let mut incoming = HeaderMap::new();
        incoming.insert(AUTHORIZATION, HeaderValue::from_static("\"abc.def.ghi\""));
        incoming.append(COOKIE, HeaderValue::from_static("accessToken=abc.def.ghi"));
        incoming.append(COOKIE, HeaderValue::from_static("PHPSESSID=42"));
        incoming.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let headers = passthrough_headers(&incoming);
        assert!(
            headers
                .get(AUTHORIZATION)
                .is_some_and(|value| value == "Bearer abc.def.ghi")
        );
        assert_eq!(headers.get_all(COOKIE).iter().count(), 2);
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn passthrough_without_credentials_is_empty() {
        let mut incoming = HeaderMap::new();
        incoming.insert(AUTHORIZATION, HeaderValue::from_static("   "));
        assert!(passthrough_headers(&incoming).is_empty());
    }

    #[test]
    fn missing_upstream_is_reported() {
        let err = configured(None, TARGET_IMPORT_USER_JOBS).err();
        assert_eq!(
            err.map(|err| err.status),
            Some(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}
