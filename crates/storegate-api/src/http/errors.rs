//! RFC9457-style API error wrapper.
//!
//! Proxy failures never carry upstream or internal detail to the caller: the
//! detail strings used here are fixed and the causes are logged where the
//! error is raised.

use axum::{
    Json,
    http::{HeaderValue, Method, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::http::constants::{
    DETAIL_NOT_CONFIGURED, DETAIL_PROXY_ERROR, PROBLEM_BAD_REQUEST, PROBLEM_INTERNAL,
    PROBLEM_METHOD_NOT_ALLOWED, PROBLEM_PAYLOAD_TOO_LARGE, PROBLEM_UPSTREAM_NOT_CONFIGURED,
};

/// RFC9457 problem document.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short summary of the problem type.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Occurrence-specific explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Structured API error with optional RFC9457 fields.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
    allow: Option<String>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
            allow: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    /// Generic failure of a proxied call.
    pub(crate) fn proxy() -> Self {
        Self::internal(DETAIL_PROXY_ERROR)
    }

    pub(crate) fn upstream_not_configured() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_UPSTREAM_NOT_CONFIGURED,
            "upstream not configured",
        )
        .with_detail(DETAIL_NOT_CONFIGURED)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            PROBLEM_PAYLOAD_TOO_LARGE,
            "payload too large",
        )
        .with_detail(format!("request body exceeds {limit} bytes"))
    }

    /// 405 answer listing the supported methods plus `OPTIONS`.
    pub(crate) fn method_not_allowed(methods: &[Method]) -> Self {
        let mut error = Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            PROBLEM_METHOD_NOT_ALLOWED,
            "method not allowed",
        )
        .with_detail("method not allowed");
        error.allow = Some(allow_list(methods));
        error
    }
}

/// Render `methods` followed by `OPTIONS`, comma separated.
pub(crate) fn allow_list(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .chain(std::iter::once(Method::OPTIONS.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(allow) = self.allow.and_then(|value| HeaderValue::from_str(&value).ok()) {
            response.headers_mut().insert(ALLOW, allow);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    #[tokio::test]
    async fn proxy_errors_render_generic_problem() -> Result<(), Box<dyn std::error::Error>> {
        let response = ApiError::proxy().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let value: Value = serde_json::from_slice(&body)?;
        assert_eq!(value["type"], PROBLEM_INTERNAL);
        assert_eq!(value["detail"], "proxy error");
        assert_eq!(value["status"], 500);
        Ok(())
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let response = ApiError::method_not_allowed(&[Method::GET]).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response
                .headers()
                .get(ALLOW)
                .and_then(|value| value.to_str().ok()),
            Some("GET, OPTIONS")
        );
    }

    #[test]
    fn allow_list_appends_options() {
        assert_eq!(allow_list(&[Method::POST]), "POST, OPTIONS");
        assert_eq!(allow_list(&[]), "OPTIONS");
    }
}
