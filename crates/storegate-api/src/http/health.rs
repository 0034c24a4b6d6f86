//! Health and diagnostics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use storegate_telemetry::build_sha;
use tracing::error;

use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Serialize)]
pub(crate) struct UpstreamSummary {
    pub(crate) graphql: bool,
    pub(crate) import_products: bool,
    pub(crate) import_user_jobs: bool,
    pub(crate) store_header: bool,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) build: String,
    pub(crate) degraded: Vec<&'static str>,
    pub(crate) upstreams: UpstreamSummary,
    pub(crate) upstream_failures_total: u64,
}

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let upstreams = UpstreamSummary {
        graphql: state.upstream.graphql_url.is_some(),
        import_products: state.upstream.import_products_url.is_some(),
        import_user_jobs: state.upstream.import_user_jobs_url.is_some(),
        store_header: state.store_header.is_some(),
    };
    let degraded: Vec<&'static str> = [
        ("graphql", upstreams.graphql),
        ("import_products", upstreams.import_products),
        ("import_user_jobs", upstreams.import_user_jobs),
    ]
    .into_iter()
    .filter_map(|(name, configured)| (!configured).then_some(name))
    .collect();
    let status = if degraded.is_empty() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        build: build_sha().to_string(),
        degraded,
        upstreams,
        upstream_failures_total: state.telemetry.snapshot().upstream_failures_total,
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
