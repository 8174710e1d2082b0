//! # BRRTRouter Testkit
//!
//! In-process scenario harness for HTTP middleware. A test fabricates a request,
//! attaches authentication artifacts, dispatches it through a router without any
//! network, and asserts on the captured response.
//!
//! ## Architecture
//!
//! - **[`scenario`]** - [`ScenarioContext`]: request fabrication, credential attachment,
//!   dispatch, response capture and JSON decoding; [`middleware_scenario`] runner
//! - **[`router`]** - regex path router with a middleware chain, and the
//!   [`ServeHttp`](router::ServeHttp) seam the harness drives
//! - **[`server`]** - request builders, cookie/query parsing, the
//!   [`ResponseRecorder`](server::ResponseRecorder) and handler response types
//! - **[`context`]** - per-request [`ReqContext`](context::ReqContext) handed to handlers
//! - **[`middleware`]** - the [`Middleware`](middleware::Middleware) trait and request tracing
//! - **[`fakes`]** - scripted user token service and in-memory remote cache
//! - **[`fixtures`]** - canonical API key and content type constants
//! - **[`config`]** - harness settings (login cookie name, session lifetimes)
//! - **[`logging`]** - `tracing` subscriber setup for tests and tools
//!
//! ## Example
//!
//! ```rust
//! use brrtrouter_testkit::middleware_scenario;
//!
//! middleware_scenario("cookie reaches the handler", |sc| {
//!     sc.with_token_session_cookie("ceba1a85")
//!         .fake_req("GET", "/")
//!         .handler(|c| {
//!             let cookie = c.get_cookie("brrtr_session").unwrap_or_default().to_string();
//!             c.json_ok(&serde_json::json!({ "cookie": cookie }));
//!         })
//!         .exec();
//!
//!     assert_eq!(sc.resp_json().unwrap()["cookie"], "ceba1a85");
//! });
//! ```
//!
//! Tests that do not care about response bodies leave the handler unset; the
//! default route then answers `200 {"message":"OK"}`.

pub mod config;
pub mod context;
mod error;
pub mod fakes;
pub mod fixtures;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod scenario;
pub mod server;

pub use config::HarnessConfig;
pub use context::{HandlerFn, ReqContext, SignedInUser};
pub use error::{RouterError, ScenarioError};
pub use fixtures::{JSON_CONTENT_TYPE, VALID_API_KEY};
pub use scenario::{middleware_scenario, middleware_scenario_with, ScenarioContext, ScenarioFn};
