use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::context::ReqContext;
use crate::server::HandlerResponse;

/// Logs request start and completion with status and latency.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, ctx: &mut ReqContext) -> Option<HandlerResponse> {
        debug!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            header_count = ctx.headers.len(),
            cookie_count = ctx.cookies.len(),
            "Request started"
        );
        None
    }

    fn after(&self, ctx: &ReqContext, res: &mut HandlerResponse, latency: Duration) {
        info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            status = res.status,
            signed_in = ctx.is_signed_in,
            latency_us = latency.as_micros() as u64,
            "Request completed"
        );
    }
}
