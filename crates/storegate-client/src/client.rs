//! HTTP client for the proxy routes.
//!
//! # Design
//! - The bearer token comes from a shared [`TokenCell`]; the client never
//!   stores credentials of its own.
//! - GraphQL application errors win over transport status so callers see the
//!   upstream message when there is one.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use storegate_session::TokenCell;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::models::{GraphqlRequest, GraphqlResponse, ImportProductsRequest};

const GRAPHQL_PATH: &str = "api/graphql-proxy";
const IMPORT_PRODUCTS_PATH: &str = "api/import-products";
const IMPORT_USER_JOBS_PATH: &str = "api/import-user-jobs";

/// Client for the dashboard proxy.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: Client,
    base: Url,
    tokens: Arc<TokenCell>,
}

impl GraphqlClient {
    /// Build a client for the proxy at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot
    /// be built.
    pub fn new(
        base_url: &str,
        tokens: Arc<TokenCell>,
        timeout: Option<Duration>,
    ) -> ClientResult<Self> {
        let mut base =
            Url::parse(base_url).map_err(|source| ClientError::InvalidUrl { source })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| ClientError::Build { source })?;
        Ok(Self { http, base, tokens })
    }

    /// Token cell consulted on every call.
    #[must_use]
    pub fn tokens(&self) -> Arc<TokenCell> {
        Arc::clone(&self.tokens)
    }

    /// Run a GraphQL operation and return its `data` member.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Graphql`] carrying the first upstream error
    /// message, [`ClientError::Proxy`] for other failed answers, and
    /// [`ClientError::Transport`] when the proxy cannot be reached.
    pub async fn execute(&self, request: &GraphqlRequest) -> ClientResult<Value> {
        let builder = self.http.post(self.endpoint(GRAPHQL_PATH)?).json(request);
        let response = self.send(builder).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { source })?;

        let Ok(parsed) = serde_json::from_slice::<GraphqlResponse>(&body) else {
            warn!(status = status.as_u16(), "proxy returned a non-graphql body");
            return Err(ClientError::Proxy { status });
        };
        if let Some(first) = parsed.errors.into_iter().next() {
            debug!(status = status.as_u16(), "graphql operation returned errors");
            return Err(ClientError::Graphql {
                message: first.message,
            });
        }
        if !status.is_success() {
            return Err(ClientError::Proxy { status });
        }
        Ok(parsed.data.unwrap_or(Value::Null))
    }

    /// Upload a bulk product import.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Proxy`] for a failed answer and
    /// [`ClientError::Transport`] when the proxy cannot be reached.
    pub async fn import_products(&self, request: ImportProductsRequest) -> ClientResult<Value> {
        let csv = Part::bytes(request.csv)
            .file_name(request.csv_file_name)
            .mime_str("text/csv")
            .map_err(|source| ClientError::Multipart { source })?;
        let mut form = Form::new()
            .part("file", csv)
            .text("warehouse_id", request.warehouse_id);
        if let Some(images) = request.images_zip {
            let images = Part::bytes(images)
                .file_name("images.zip")
                .mime_str("application/zip")
                .map_err(|source| ClientError::Multipart { source })?;
            form = form.part("images", images);
        }

        let builder = self
            .http
            .post(self.endpoint(IMPORT_PRODUCTS_PATH)?)
            .multipart(form);
        json_or_status(self.send(builder).await?).await
    }

    /// List the signed-in user's import jobs.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Proxy`] for a failed answer and
    /// [`ClientError::Transport`] when the proxy cannot be reached.
    pub async fn list_user_jobs(&self) -> ClientResult<Value> {
        let builder = self.http.get(self.endpoint(IMPORT_USER_JOBS_PATH)?);
        json_or_status(self.send(builder).await?).await
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|source| ClientError::InvalidUrl { source })
    }

    async fn send(&self, mut builder: RequestBuilder) -> ClientResult<Response> {
        if let Some(token) = self.tokens.get_auth_token() {
            builder = builder.header(AUTHORIZATION, bearer(&token));
        }
        builder
            .send()
            .await
            .map_err(|source| ClientError::Transport { source })
    }
}

fn bearer(token: &str) -> String {
    let has_scheme = token
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "));
    if has_scheme {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

async fn json_or_status(response: Response) -> ClientResult<Value> {
    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "proxy call failed");
        return Err(ClientError::Proxy { status });
    }
    let body = response
        .bytes()
        .await
        .map_err(|source| ClientError::Transport { source })?;
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|_| ClientError::Proxy { status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use reqwest::StatusCode;
    use serde_json::json;
    use storegate_test_support::fixtures::unreachable_url;
    use storegate_test_support::{MockResponse, MockUpstream};

    fn client(base: &str, token: Option<&str>) -> ClientResult<GraphqlClient> {
        let cell = Arc::new(TokenCell::new());
        cell.set_auth_token(token);
        GraphqlClient::new(base, cell, Some(Duration::from_secs(5)))
    }

    #[test]
    fn bearer_scheme_is_added_once() {
        assert_eq!(bearer("abc.def.ghi"), "Bearer abc.def.ghi");
        assert_eq!(bearer("bearer abc"), "bearer abc");
        assert_eq!(bearer("short"), "Bearer short");
    }

    #[tokio::test]
    async fn execute_posts_the_envelope_with_the_token() -> Result<()> {
        let proxy = MockUpstream::start(MockResponse::json(
            StatusCode::OK,
            r#"{"data":{"customer":{"email":"a@b.c"}}}"#,
        ))
        .await?;
        let client = client(&proxy.base_url(), Some("abc.def.ghi"))?;
        let data = client
            .execute(&GraphqlRequest::new("query Me { customer { email } }").with_operation_name("Me"))
            .await?;
        assert_eq!(data["customer"]["email"], "a@b.c");

        let recorded = proxy.last_request().context("proxy not called")?;
        assert_eq!(recorded.path, "/api/graphql-proxy");
        assert_eq!(recorded.header("authorization"), Some("Bearer abc.def.ghi"));
        let sent: Value = serde_json::from_slice(&recorded.body)?;
        assert_eq!(sent["operationName"], "Me");
        Ok(())
    }

    #[tokio::test]
    async fn graphql_errors_take_priority() -> Result<()> {
        let proxy = MockUpstream::start(MockResponse::json(
            StatusCode::OK,
            r#"{"errors":[{"message":"The account sign-in was incorrect."}]}"#,
        ))
        .await?;
        let client = client(&proxy.base_url(), None)?;
        let err = client.execute(&GraphqlRequest::new("mutation Login { x }")).await;
        assert!(matches!(
            err,
            Err(ClientError::Graphql { ref message }) if message == "The account sign-in was incorrect."
        ));
        assert_eq!(
            proxy.last_request().and_then(|r| r.header("authorization").map(str::to_string)),
            None
        );
        Ok(())
    }

    #[tokio::test]
    async fn problem_bodies_become_proxy_errors() -> Result<()> {
        let proxy = MockUpstream::start(MockResponse::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"type":"https://storegate.dev/problems/internal","title":"internal server error","status":500,"detail":"proxy error"}"#,
        ))
        .await?;
        let client = client(&proxy.base_url(), None)?;
        let err = client.execute(&GraphqlRequest::new("query A { a }")).await;
        assert!(matches!(
            err,
            Err(ClientError::Proxy { status }) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        Ok(())
    }

    #[tokio::test]
    async fn import_products_sends_multipart_parts() -> Result<()> {
        let proxy = MockUpstream::start(MockResponse::json(StatusCode::OK, r#"{"job_id":3}"#)).await?;
        let client = client(&format!("{}/dashboard", proxy.base_url()), Some("abc.def.ghi"))?;
        let result = client
            .import_products(ImportProductsRequest {
                csv: b"sku,name\nSKU-1,Widget\n".to_vec(),
                csv_file_name: "products.csv".to_string(),
                images_zip: Some(vec![0x50, 0x4b, 0x03, 0x04]),
                warehouse_id: "7".to_string(),
            })
            .await?;
        assert_eq!(result, json!({ "job_id": 3 }));

        let recorded = proxy.last_request().context("proxy not called")?;
        assert_eq!(recorded.path, "/dashboard/api/import-products");
        assert!(
            recorded
                .header("content-type")
                .is_some_and(|value| value.starts_with("multipart/form-data; boundary="))
        );
        let body = String::from_utf8_lossy(&recorded.body);
        assert!(body.contains("name=\"file\"; filename=\"products.csv\""));
        assert!(body.contains("name=\"images\"; filename=\"images.zip\""));
        assert!(body.contains("name=\"warehouse_id\""));
        Ok(())
    }

    #[tokio::test]
    async fn list_user_jobs_maps_failures() -> Result<()> {
        let proxy = MockUpstream::start(MockResponse::status(StatusCode::UNAUTHORIZED)).await?;
        let stale = client(&proxy.base_url(), Some("stale"))?;
        let err = stale.list_user_jobs().await;
        assert!(matches!(err, Err(ClientError::Proxy { status }) if status == StatusCode::UNAUTHORIZED));
        assert_eq!(
            proxy.last_request().map(|request| request.method),
            Some(reqwest::Method::GET)
        );

        let offline = client(&unreachable_url("")?, None)?;
        assert!(matches!(
            offline.list_user_jobs().await,
            Err(ClientError::Transport { .. })
        ));
        Ok(())
    }
}
