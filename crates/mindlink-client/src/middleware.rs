//! The standard middleware: tracing, refresh-and-retry, bearer tokens.

use std::time::Instant;

use futures_util::future::BoxFuture;
use mindlink_transport::{ApiRequest, RequestId};
use tracing::{Instrument, debug, info_span, warn};

use crate::pipeline::{Middleware, Next, PipelineResult, RequestContext};

/// Wraps each request in a span and logs its outcome.
pub struct RequestTrace;

impl Middleware for RequestTrace {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn handle<'a>(
        &'a self,
        request: ApiRequest,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult> {
        let span = info_span!(
            "api_request",
            id = %RequestId::next(),
            method = %request.method,
            path = %request.path,
        );
        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(request, ctx).await;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                match &result {
                    Ok(response) => debug!(status = response.status, elapsed_ms, "response"),
                    Err(e) => warn!(error = %e, elapsed_ms, "request failed"),
                }
                result
            }
            .instrument(span),
        )
    }
}

/// Recovers from an expired access token: on a 401 for a protected path,
/// refreshes once (sharing any refresh already in flight) and replays the
/// request. If the token was already replaced while the request was out,
/// the request is replayed with the new one without another refresh. A
/// second 401 is returned as is.
pub struct RefreshOnUnauthorized;

impl Middleware for RefreshOnUnauthorized {
    fn name(&self) -> &'static str {
        "refresh"
    }

    fn handle<'a>(
        &'a self,
        request: ApiRequest,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult> {
        Box::pin(async move {
            if ctx.is_public(&request.path) {
                return next.run(request, ctx).await;
            }

            let replay = request.clone();
            // BearerAuth attaches this token further down the chain.
            let sent_with = ctx.authenticator().access_token();
            let response = next.run(request, ctx).await?;
            if !response.is_unauthorized() {
                return Ok(response);
            }

            let current = ctx.authenticator().access_token();
            if current.is_some() && current != sent_with {
                debug!(path = %replay.path, "401 for a superseded token, retrying");
                return next.run(replay, ctx).await;
            }

            debug!(path = %replay.path, "401 received, attempting refresh");
            if ctx.authenticator().refresh().await {
                next.run(replay, ctx).await
            } else {
                debug!(path = %replay.path, "refresh failed, returning 401");
                Ok(response)
            }
        })
    }
}

/// Attaches `Authorization: Bearer <token>` to protected requests when an
/// access token is held. Auth endpoints pass through untouched.
pub struct BearerAuth;

impl Middleware for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer"
    }

    fn handle<'a>(
        &'a self,
        mut request: ApiRequest,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult> {
        if !ctx.is_public(&request.path) {
            if let Some(token) = ctx.authenticator().access_token() {
                request.set_header("Authorization", format!("Bearer {token}"));
            }
        }
        next.run(request, ctx)
    }
}
