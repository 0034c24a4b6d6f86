//! Per-request accounting for the proxy routes.
//!
//! Counts every routed request by matched path and status, and keeps the
//! request's identity in scope so upstream calls can be traced back to it.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use storegate_telemetry::{Metrics, NO_REQUEST_ID, REQUEST_ID_HEADER, RequestContext};
use tracing::warn;

pub(crate) async fn track_request(
    State(telemetry): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let route = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(NO_REQUEST_ID);
    let context = RequestContext::new(request_id, &route);

    let response = context.clone().scope(next.run(request)).await;
    let status = response.status();
    telemetry.inc_http_request(&route, status.as_u16());
    if status.is_server_error() {
        warn!(
            route = context.route(),
            request_id = context.request_id(),
            status = status.as_u16(),
            "proxy answered with a server error"
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use storegate_telemetry::current_request_id;
    use tower::ServiceExt;

    async fn report_request_id() -> String {
        current_request_id()
    }

    async fn fail() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn app(metrics: &Metrics) -> Router {
        Router::new()
            .route("/jobs/{id}", get(report_request_id))
            .route("/broken", get(fail))
            .route_layer(middleware::from_fn_with_state(
                metrics.clone(),
                track_request,
            ))
    }

    #[tokio::test]
    async fn handlers_see_the_request_id_and_routes_are_counted() -> Result<()> {
        let metrics = Metrics::new()?;
        let request = axum::http::Request::builder()
            .uri("/jobs/41")
            .header(REQUEST_ID_HEADER, "dash-9")
            .body(Body::empty())?;
        let response = app(&metrics).oneshot(request).await?;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(body.as_ref(), b"dash-9");

        let anonymous = axum::http::Request::builder()
            .uri("/broken")
            .body(Body::empty())?;
        let response = app(&metrics).oneshot(anonymous).await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let rendered = metrics.render()?;
        assert!(rendered.contains("route=\"/jobs/{id}\""));
        assert!(rendered.contains("code=\"500\""));
        Ok(())
    }
}
