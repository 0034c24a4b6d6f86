//! Router construction and server host for the proxy.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::Request,
    middleware,
    routing::{any, get},
};
use storegate_config::ProxyConfig;
use storegate_telemetry::{Metrics, REQUEST_ID_HEADER, build_sha, request_id_layer};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::{ROUTE_GRAPHQL_PROXY, ROUTE_IMPORT_PRODUCTS, ROUTE_IMPORT_USER_JOBS};
use crate::http::graphql::graphql_proxy;
use crate::http::health::{health, metrics};
use crate::http::imports::{import_products, import_user_jobs};
use crate::http::telemetry::track_request;
use crate::state::ApiState;

/// Axum router wrapper that hosts the proxy routes.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream client cannot be built or the
    /// configured store code is not a valid header value.
    pub fn new(config: &ProxyConfig, telemetry: Metrics) -> ApiServerResult<Self> {
        let state = Arc::new(ApiState::new(config, telemetry.clone())?);

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(request_id_layer())
            .layer(trace_layer)
            .layer(middleware::from_fn_with_state(telemetry, track_request));

        let router = Self::build_router()
            .route_layer(layered)
            .with_state(state);
        Ok(Self { router })
    }

    fn build_router() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route(ROUTE_GRAPHQL_PROXY, any(graphql_proxy))
            .route(ROUTE_IMPORT_PRODUCTS, any(import_products))
            .route(ROUTE_IMPORT_USER_JOBS, any(import_user_jobs))
    }

    /// Router with every layer applied.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the server terminates unexpectedly.
    pub async fn serve_listener<F>(self, listener: TcpListener, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(addr = ?listener.local_addr().ok(), "starting storegate proxy");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}
