use std::time::Duration;

use crate::context::ReqContext;
use crate::server::HandlerResponse;

/// Hook run around every routed request.
///
/// `before` runs in registration order and may short-circuit by returning a
/// response; remaining `before` hooks still run but the handler does not. `after`
/// always runs, in registration order, with the final response.
pub trait Middleware: Send + Sync {
    fn before(&self, _ctx: &mut ReqContext) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _ctx: &ReqContext, _res: &mut HandlerResponse, _latency: Duration) {}
}
