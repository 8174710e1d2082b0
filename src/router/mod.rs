//! # Router Module
//!
//! The in-process router a scenario dispatches through:
//! method + path pattern matching, a middleware chain and a not-found fallback, all
//! synchronous.
//!
//! ## Matching
//!
//! Patterns use `{name}` segments (`/api/users/{id}`). At registration each pattern
//! is compiled to an anchored regex; at dispatch routes are tried in registration
//! order and the first one whose method and regex match wins.
//!
//! ## Dispatch
//!
//! 1. Parse headers, cookies and query string into a [`ReqContext`](crate::context::ReqContext)
//! 2. Run every middleware `before` hook; the first response returned short-circuits
//! 3. Otherwise run the matched handler (or the not-found handler)
//! 4. Run every middleware `after` hook with the final response
//! 5. Stamp `X-Request-ID` and write the response through [`ServeHttp`]

mod core;
mod request_id;
mod serve;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use request_id::{RequestId, REQUEST_ID_HEADER};
pub use serve::ServeHttp;
