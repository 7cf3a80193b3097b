//! The outbound request pipeline.
//!
//! Every API request passes through an ordered list of [`Middleware`]
//! before it reaches the transport:
//!
//! ```text
//! RequestTrace → RefreshOnUnauthorized → BearerAuth → transport
//! ```
//!
//! Each middleware receives the request, the shared [`RequestContext`] and
//! a [`Next`] continuation. `Next` is `Copy`, so a middleware may run the
//! rest of the chain more than once; that is how a request is retried
//! after a refresh, and why the retry picks up the new bearer token.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use mindlink_session::{AuthEndpoints, Authenticator};
use mindlink_transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};

use crate::middleware::{BearerAuth, RefreshOnUnauthorized, RequestTrace};

/// Result of running (part of) the pipeline.
pub type PipelineResult = Result<ApiResponse, TransportError>;

/// Object-safe view of an [`HttpTransport`], the last stage of the chain.
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, request: ApiRequest) -> BoxFuture<'_, PipelineResult>;
}

impl<T: HttpTransport> Endpoint for T {
    fn call(&self, request: ApiRequest) -> BoxFuture<'_, PipelineResult> {
        Box::pin(self.send(request))
    }
}

/// One stage of the pipeline.
pub trait Middleware: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Handles `request`, usually by calling `next.run(...)` one or more
    /// times.
    fn handle<'a>(
        &'a self,
        request: ApiRequest,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult>;
}

/// Shared state every middleware can read.
pub struct RequestContext {
    auth: Arc<dyn Authenticator>,
    endpoints: AuthEndpoints,
}

impl RequestContext {
    pub fn new(auth: Arc<dyn Authenticator>, endpoints: AuthEndpoints) -> Self {
        Self { auth, endpoints }
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.auth.as_ref()
    }

    /// Whether `path` is an unauthenticated auth endpoint.
    pub fn is_public(&self, path: &str) -> bool {
        self.endpoints.is_public(path)
    }
}

/// The remainder of the chain after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: &'a [Box<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Runs the remaining middleware and finally the transport.
    pub fn run(self, request: ApiRequest, ctx: &'a RequestContext) -> BoxFuture<'a, PipelineResult> {
        match self.rest.split_first() {
            Some((head, rest)) => head.handle(
                request,
                ctx,
                Next {
                    rest,
                    endpoint: self.endpoint,
                },
            ),
            None => self.endpoint.call(request),
        }
    }
}

/// A transport wrapped in the fixed middleware chain.
pub struct Pipeline {
    middleware: Vec<Box<dyn Middleware>>,
    endpoint: Box<dyn Endpoint>,
    ctx: RequestContext,
}

impl Pipeline {
    /// Builds the standard chain with the default auth endpoints.
    pub fn new(transport: impl HttpTransport, auth: Arc<dyn Authenticator>) -> Self {
        Self::with_endpoints(transport, auth, AuthEndpoints::default())
    }

    pub fn with_endpoints(
        transport: impl HttpTransport,
        auth: Arc<dyn Authenticator>,
        endpoints: AuthEndpoints,
    ) -> Self {
        Self {
            middleware: vec![
                Box::new(RequestTrace),
                Box::new(RefreshOnUnauthorized),
                Box::new(BearerAuth),
            ],
            endpoint: Box::new(transport),
            ctx: RequestContext::new(auth, endpoints),
        }
    }

    /// Middleware names in execution order.
    pub fn layers(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Sends `request` through the whole chain.
    pub async fn execute(&self, request: ApiRequest) -> PipelineResult {
        let next = Next {
            rest: &self.middleware,
            endpoint: self.endpoint.as_ref(),
        };
        next.run(request, &self.ctx).await
    }
}
