//! `x-request-id` handling for the proxy router.
//!
//! A missing id is generated before the request reaches any handler, then the
//! final id is echoed on the response so dashboard reports can be matched
//! with proxy logs.

use tower::layer::util::Stack;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate-then-echo stack returned by [`request_id_layer`].
pub type RequestIdLayer = Stack<PropagateRequestIdLayer, SetRequestIdLayer<MakeRequestUuid>>;

/// Layer that assigns an `x-request-id` when the caller sent none and copies
/// the id onto the response.
#[must_use]
pub fn request_id_layer() -> RequestIdLayer {
    Stack::new(
        PropagateRequestIdLayer::x_request_id(),
        SetRequestIdLayer::x_request_id(MakeRequestUuid),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::error::Error;

    use axum::body::Body;
    use axum::http::{HeaderValue, Request, Response};
    use tower::{ServiceBuilder, ServiceExt};

    async fn echo_seen_id(request: Request<Body>) -> Result<Response<Body>, Infallible> {
        let seen = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .map(|value| value.as_bytes().to_vec())
            .unwrap_or_default();
        Ok(Response::new(Body::from(seen)))
    }

    #[tokio::test]
    async fn generated_id_reaches_handler_and_response() -> Result<(), Box<dyn Error>> {
        let service = ServiceBuilder::new()
            .layer(request_id_layer())
            .service_fn(echo_seen_id);
        let response = service.oneshot(Request::new(Body::empty())).await?;

        let echoed = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .ok_or("response carries no request id")?
            .to_str()?
            .to_string();
        assert_eq!(echoed.len(), 36);
        let seen = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(seen.as_ref(), echoed.as_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn caller_supplied_id_is_kept() -> Result<(), Box<dyn Error>> {
        let service = ServiceBuilder::new()
            .layer(request_id_layer())
            .service_fn(echo_seen_id);
        let mut request = Request::new(Body::empty());
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, HeaderValue::from_static("dash-123"));
        let response = service.oneshot(request).await?;
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER),
            Some(&HeaderValue::from_static("dash-123"))
        );
        Ok(())
    }
}
