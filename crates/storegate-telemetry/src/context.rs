//! Request-scoped context shared between the HTTP layer and upstream calls.
//!
//! # Design
//! - A proxied request is served on one task, so its request id and matched
//!   route live in a task-local for the duration of the call.
//! - The forwarder reads the context back to tag upstream spans and failure
//!   logs; work spawned onto other tasks does not inherit it.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Placeholder logged when no request context is active.
pub const NO_REQUEST_ID: &str = "-";

/// Guard that keeps the process-level span entered for the lifetime of the binary.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter a `storegate` span tagged with `component` and the build SHA.
    #[must_use]
    pub fn new(component: &'static str) -> Self {
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "storegate",
            component,
            build_sha = %build_sha()
        )));
        Self {
            _guard: span.enter(),
        }
    }
}

/// Identity of the proxied request currently being served.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Arc<str>,
    route: Arc<str>,
}

impl RequestContext {
    /// Context for a request with `request_id` matched to `route`.
    #[must_use]
    pub fn new(request_id: &str, route: &str) -> Self {
        Self {
            request_id: Arc::from(request_id),
            route: Arc::from(route),
        }
    }

    /// Value of the request's `x-request-id`.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Matched route template.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Run `fut` with this context active.
    pub fn scope<F>(self, fut: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        ACTIVE_REQUEST.scope(self, fut)
    }

    /// Context of the request being served on this task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE_REQUEST.try_with(Self::clone).ok()
    }
}

/// Request id of the request being served on this task, or [`NO_REQUEST_ID`].
#[must_use]
pub fn current_request_id() -> String {
    RequestContext::current().map_or_else(
        || NO_REQUEST_ID.to_string(),
        |context| context.request_id().to_string(),
    )
}

/// Span covering one upstream call made on behalf of the current request.
#[must_use]
pub fn upstream_span(target: &'static str) -> Span {
    let context = RequestContext::current();
    tracing::info_span!(
        "upstream",
        target_name = target,
        request_id = context.as_ref().map_or(NO_REQUEST_ID, RequestContext::request_id),
        route = context.as_ref().map_or(NO_REQUEST_ID, RequestContext::route),
    )
}

tokio::task_local! {
    static ACTIVE_REQUEST: RequestContext;
}
