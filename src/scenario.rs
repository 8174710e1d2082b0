//! # Scenario Harness
//!
//! A [`ScenarioContext`] drives one fabricated request through a router and keeps
//! what came back:
//!
//! 1. configure credentials: [`with_valid_api_key`](ScenarioContext::with_valid_api_key),
//!    [`with_authorization_header`](ScenarioContext::with_authorization_header),
//!    [`with_token_session_cookie`](ScenarioContext::with_token_session_cookie)
//! 2. build the request: [`fake_req`](ScenarioContext::fake_req) or
//!    [`fake_req_with_params`](ScenarioContext::fake_req_with_params)
//! 3. optionally set the handler-under-test with [`handler`](ScenarioContext::handler)
//! 4. [`exec`](ScenarioContext::exec), then assert on
//!    [`resp`](ScenarioContext::resp), [`resp_json`](ScenarioContext::resp_json) and
//!    [`context`](ScenarioContext::context)
//!
//! Credentials are not mutually exclusive: everything configured is attached to the
//! same request.
//!
//! Malformed scenarios (bad method or URL, `exec` without a request, a response
//! labelled JSON that does not decode) fail the test by panicking at the caller.
//! Each panicking step has a `try_` twin returning [`ScenarioError`].
//!
//! ```rust
//! use brrtrouter_testkit::scenario::middleware_scenario;
//!
//! middleware_scenario("handler sees the api key", |sc| {
//!     sc.with_valid_api_key()
//!         .fake_req("GET", "/")
//!         .handler(|c| {
//!             let auth = c.get_header("authorization").unwrap_or_default().to_string();
//!             c.json_ok(&serde_json::json!({ "auth": auth }));
//!         })
//!         .exec();
//!
//!     assert_eq!(sc.resp().status(), 200);
//!     let auth = sc.resp_json().unwrap()["auth"].as_str().unwrap();
//!     assert!(auth.starts_with("Bearer eyJrIjoi"));
//! });
//! ```

use crate::config::HarnessConfig;
use crate::context::{HandlerFn, ReqContext};
use crate::error::ScenarioError;
use crate::fakes::{FakeUserAuthTokenService, InMemoryRemoteCache};
use crate::fixtures::{JSON_CONTENT_TYPE, VALID_API_KEY};
use crate::logging::{init_test_logging_with, LogConfig};
use crate::middleware::TracingMiddleware;
use crate::router::{Router, ServeHttp};
use crate::server::{build_request, merged_cookie, HttpRequest, ResponseRecorder};
use http::header::{HeaderValue, AUTHORIZATION, COOKIE};
use http::Method;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info_span};

/// Scenario body.
pub type ScenarioFn = fn(&mut ScenarioContext);

/// Shared slot holding the handler-under-test.
///
/// The scenario writes it, routes wired to the scenario read it at dispatch time, so
/// the handler can be chosen after the router was built.
#[derive(Clone, Default)]
pub struct HandlerSlot(Arc<Mutex<Option<HandlerFn>>>);

impl HandlerSlot {
    pub fn set(&self, handler: HandlerFn) {
        *self.0.lock() = Some(handler);
    }

    #[must_use]
    pub fn get(&self) -> Option<HandlerFn> {
        self.0.lock().clone()
    }
}

/// Shared slot receiving the request context a handler saw.
#[derive(Clone, Default)]
pub struct ContextCapture(Arc<Mutex<Option<ReqContext>>>);

impl ContextCapture {
    pub fn store(&self, ctx: ReqContext) {
        *self.0.lock() = Some(ctx);
    }

    #[must_use]
    pub fn get(&self) -> Option<ReqContext> {
        self.0.lock().clone()
    }
}

/// Handler that records the request context and runs the handler-under-test.
///
/// Without a handler-under-test it answers `200 {"message":"OK"}`.
#[must_use]
pub fn default_handler(slot: HandlerSlot, capture: ContextCapture) -> HandlerFn {
    Arc::new(move |c: &mut ReqContext| {
        match slot.get() {
            Some(handler) => handler(c),
            None => c.json_ok(&serde_json::json!({ "message": "OK" })),
        }
        capture.store(c.clone());
    })
}

/// Collaborators shared by a scenario and the routes wired to it.
#[derive(Clone)]
pub struct ScenarioServices {
    pub config: HarnessConfig,
    pub user_auth_token_service: Arc<FakeUserAuthTokenService>,
    pub remote_cache: Arc<InMemoryRemoteCache>,
}

impl ScenarioServices {
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            user_auth_token_service: Arc::new(FakeUserAuthTokenService::new()),
            remote_cache: Arc::new(InMemoryRemoteCache::new()),
        }
    }
}

/// Run `body` against a router whose `GET /` is the scenario's default handler.
pub fn middleware_scenario<F>(desc: &str, body: F)
where
    F: FnOnce(&mut ScenarioContext),
{
    middleware_scenario_with(desc, |_, _| {}, body);
}

/// Like [`middleware_scenario`], letting `setup` install middleware and routes first.
///
/// `setup` receives the router and the services the scenario will expose, so a
/// middleware under test can be built on the same fakes the scenario scripts.
/// Routes registered by `setup` take precedence over the default `GET /`.
#[track_caller]
#[allow(clippy::panic)]
pub fn middleware_scenario_with<S, F>(desc: &str, setup: S, body: F)
where
    S: FnOnce(&mut Router, &ScenarioServices),
    F: FnOnce(&mut ScenarioContext),
{
    let config = HarnessConfig::from_env();
    init_test_logging_with(&LogConfig::from(&config));
    let _span = info_span!("scenario", desc = %desc).entered();

    let services = ScenarioServices::new(config);
    let slot = HandlerSlot::default();
    let capture = ContextCapture::default();
    let default = default_handler(slot.clone(), capture.clone());

    let mut router = Router::new();
    router.add_middleware(Arc::new(TracingMiddleware));
    setup(&mut router, &services);
    if let Err(e) = router.handle_fn(Method::GET, "/", Arc::clone(&default)) {
        panic!("scenario {desc:?}: failed to register default route: {e}");
    }

    let mut sc = ScenarioContext::builder()
        .services(services)
        .router(Arc::new(router))
        .default_handler(default)
        .handler_slot(slot)
        .capture(capture)
        .build();

    debug!("Running scenario");
    body(&mut sc);
}

/// Assembles a [`ScenarioContext`] from its collaborators.
#[derive(Default)]
pub struct ScenarioBuilder {
    services: Option<ScenarioServices>,
    router: Option<Arc<dyn ServeHttp>>,
    default_handler: Option<HandlerFn>,
    handler_slot: Option<HandlerSlot>,
    capture: Option<ContextCapture>,
}

impl ScenarioBuilder {
    #[must_use]
    pub fn services(mut self, services: ScenarioServices) -> Self {
        self.services = Some(services);
        self
    }

    /// Shorthand for services built from `config` with fresh fakes.
    #[must_use]
    pub fn config(self, config: HarnessConfig) -> Self {
        self.services(ScenarioServices::new(config))
    }

    #[must_use]
    pub fn router(mut self, router: Arc<dyn ServeHttp>) -> Self {
        self.router = Some(router);
        self
    }

    #[must_use]
    pub fn default_handler(mut self, handler: HandlerFn) -> Self {
        self.default_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn handler_slot(mut self, slot: HandlerSlot) -> Self {
        self.handler_slot = Some(slot);
        self
    }

    #[must_use]
    pub fn capture(mut self, capture: ContextCapture) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Missing collaborators default to an empty [`Router`], default config and fresh fakes.
    #[must_use]
    pub fn build(self) -> ScenarioContext {
        let services = self
            .services
            .unwrap_or_else(|| ScenarioServices::new(HarnessConfig::default()));
        ScenarioContext {
            config: services.config,
            router: self.router.unwrap_or_else(|| Arc::new(Router::new())),
            user_auth_token_service: services.user_auth_token_service,
            remote_cache: services.remote_cache,
            default_handler: self.default_handler,
            handler_slot: self.handler_slot.unwrap_or_default(),
            capture: self.capture.unwrap_or_default(),
            api_key: String::new(),
            auth_header: String::new(),
            token_session_cookie: String::new(),
            url: String::new(),
            method: None,
            query_params: Vec::new(),
            req: None,
            resp: None,
            resp_json: None,
            executed: false,
        }
    }
}

/// One fabricated request/response cycle. See the [module docs](self).
pub struct ScenarioContext {
    config: HarnessConfig,
    router: Arc<dyn ServeHttp>,
    user_auth_token_service: Arc<FakeUserAuthTokenService>,
    remote_cache: Arc<InMemoryRemoteCache>,
    default_handler: Option<HandlerFn>,
    handler_slot: HandlerSlot,
    capture: ContextCapture,

    api_key: String,
    auth_header: String,
    token_session_cookie: String,
    url: String,
    method: Option<Method>,
    query_params: Vec<(String, String)>,

    req: Option<HttpRequest>,
    resp: Option<ResponseRecorder>,
    resp_json: Option<Map<String, Value>>,
    executed: bool,
}

impl ScenarioContext {
    #[must_use]
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::default()
    }

    /// Scenario over `router` with default config and fresh fakes.
    #[must_use]
    pub fn new(router: Arc<dyn ServeHttp>) -> Self {
        Self::builder().router(router).build()
    }

    /// Send [`VALID_API_KEY`] as `Authorization: Bearer <key>`.
    pub fn with_valid_api_key(&mut self) -> &mut Self {
        self.api_key = VALID_API_KEY.to_string();
        self
    }

    /// Send `unhashed_token` as the login cookie value, unmodified.
    pub fn with_token_session_cookie(&mut self, unhashed_token: impl Into<String>) -> &mut Self {
        self.token_session_cookie = unhashed_token.into();
        self
    }

    /// Send `value` verbatim as an `Authorization` header.
    pub fn with_authorization_header(&mut self, value: impl Into<String>) -> &mut Self {
        self.auth_header = value.into();
        self
    }

    /// Build a body-less request and a fresh recorder. Panics on a malformed method or URL.
    #[track_caller]
    #[allow(clippy::panic)]
    pub fn fake_req(&mut self, method: &str, url: &str) -> &mut Self {
        if let Err(e) = self.try_fake_req(method, url) {
            panic!("fake_req({method:?}, {url:?}): {e}");
        }
        self
    }

    pub fn try_fake_req(&mut self, method: &str, url: &str) -> Result<&mut Self, ScenarioError> {
        self.try_fake_req_with_params(method, url, std::iter::empty::<(&str, &str)>())
    }

    /// As [`fake_req`](Self::fake_req), appending `params` to the query string in order.
    #[track_caller]
    #[allow(clippy::panic)]
    pub fn fake_req_with_params<I, K, V>(&mut self, method: &str, url: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if let Err(e) = self.try_fake_req_with_params(method, url, params) {
            panic!("fake_req_with_params({method:?}, {url:?}): {e}");
        }
        self
    }

    pub fn try_fake_req_with_params<I, K, V>(
        &mut self,
        method: &str,
        url: &str,
        params: I,
    ) -> Result<&mut Self, ScenarioError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        let req = build_request(method, url, params.iter().map(|(k, v)| (k, v)))?;

        self.method = Some(req.method().clone());
        self.url = url.to_string();
        self.query_params = params;
        self.req = Some(req);
        self.resp = Some(ResponseRecorder::new());
        self.resp_json = None;
        Ok(self)
    }

    /// Set the handler-under-test, read by routes wired to this scenario's handler slot.
    pub fn handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ReqContext) + Send + Sync + 'static,
    {
        self.handler_slot.set(Arc::new(f));
        self
    }

    /// Attach credentials, dispatch, capture and decode. Panics on any [`ScenarioError`].
    #[track_caller]
    #[allow(clippy::panic)]
    pub fn exec(&mut self) {
        if let Err(e) = self.try_exec() {
            panic!("scenario exec failed: {e}");
        }
    }

    pub fn try_exec(&mut self) -> Result<(), ScenarioError> {
        if self.executed {
            return Err(ScenarioError::AlreadyExecuted);
        }
        let req = self.req.as_mut().ok_or(ScenarioError::RequestNotBuilt)?;

        // Validate everything before touching the request.
        let bearer = match self.api_key.as_str() {
            "" => None,
            key => Some(authorization_value(&format!("Bearer {key}"))?),
        };
        let raw = match self.auth_header.as_str() {
            "" => None,
            value => Some(authorization_value(value)?),
        };
        let cookie = match self.token_session_cookie.as_str() {
            "" => None,
            token => Some(merged_cookie(req, &self.config.login_cookie_name, token)?),
        };

        if let Some(value) = bearer {
            debug!(header = "Authorization", value = ?value, "Adding header");
            req.headers_mut().append(AUTHORIZATION, value);
        }
        if let Some(value) = raw {
            debug!(header = "Authorization", value = ?value, "Adding header");
            req.headers_mut().append(AUTHORIZATION, value);
        }
        if let Some(value) = cookie {
            debug!(
                name = %self.config.login_cookie_name,
                value = %self.token_session_cookie,
                "Adding cookie"
            );
            req.headers_mut().insert(COOKIE, value);
        }

        self.executed = true;
        let resp = self.resp.get_or_insert_with(ResponseRecorder::new);
        self.router.serve_http(resp, req);

        debug!(
            status = resp.status().as_u16(),
            content_type = ?resp.content_type(),
            body_bytes = resp.body().len(),
            "Response captured"
        );

        if resp.content_type() == Some(JSON_CONTENT_TYPE) {
            // A literal `null` decodes to no map.
            let mut values = serde_json::Deserializer::from_slice(resp.body())
                .into_iter::<Option<Map<String, Value>>>();
            self.resp_json = match values.next() {
                Some(Ok(map)) => map,
                Some(Err(e)) => return Err(ScenarioError::InvalidJsonBody(e)),
                None => return Err(ScenarioError::EmptyJsonBody),
            };
        }
        Ok(())
    }

    /// Captured response. Panics if no request was built.
    #[track_caller]
    #[allow(clippy::panic)]
    #[must_use]
    pub fn resp(&self) -> &ResponseRecorder {
        match &self.resp {
            Some(resp) => resp,
            None => panic!("no response recorder: call fake_req first"),
        }
    }

    #[must_use]
    pub fn try_resp(&self) -> Option<&ResponseRecorder> {
        self.resp.as_ref()
    }

    /// Decoded body, set only when the response was labelled `application/json; charset=UTF-8`.
    #[must_use]
    pub fn resp_json(&self) -> Option<&Map<String, Value>> {
        self.resp_json.as_ref()
    }

    /// The outgoing request, including anything `exec` attached.
    #[must_use]
    pub fn req(&self) -> Option<&HttpRequest> {
        self.req.as_ref()
    }

    /// Request context as the wired handler left it, once dispatched.
    #[must_use]
    pub fn context(&self) -> Option<ReqContext> {
        self.capture.get()
    }

    #[must_use]
    pub fn handler_fn(&self) -> Option<HandlerFn> {
        self.handler_slot.get()
    }

    /// Slot to wire into routes built outside [`middleware_scenario`].
    #[must_use]
    pub fn handler_slot(&self) -> HandlerSlot {
        self.handler_slot.clone()
    }

    #[must_use]
    pub fn context_capture(&self) -> ContextCapture {
        self.capture.clone()
    }

    #[must_use]
    pub fn default_handler(&self) -> Option<&HandlerFn> {
        self.default_handler.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    #[must_use]
    pub fn user_auth_token_service(&self) -> &Arc<FakeUserAuthTokenService> {
        &self.user_auth_token_service
    }

    #[must_use]
    pub fn remote_cache(&self) -> &Arc<InMemoryRemoteCache> {
        &self.remote_cache
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    #[must_use]
    pub fn token_session_cookie(&self) -> &str {
        &self.token_session_cookie
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    #[must_use]
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }
}

fn authorization_value(value: &str) -> Result<HeaderValue, ScenarioError> {
    HeaderValue::from_str(value).map_err(|e| ScenarioError::InvalidHeader {
        name: "authorization",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ResponseWriter;
    use http::header::{HeaderName, CONTENT_TYPE};
    use http::StatusCode;

    fn scripted(content_type: &'static str, body: &'static str) -> ScenarioContext {
        ScenarioContext::new(Arc::new(
            move |w: &mut dyn ResponseWriter, _req: &HttpRequest| {
                w.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                w.write(body.as_bytes());
            },
        ))
    }

    fn header_values<'a>(req: &'a HttpRequest, name: HeaderName) -> Vec<&'a str> {
        req.headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    #[test]
    fn test_valid_api_key_sent_as_bearer() {
        let mut sc = scripted("text/plain", "");
        sc.with_valid_api_key().fake_req("GET", "/").exec();
        let req = sc.req().unwrap();
        assert_eq!(
            header_values(req, AUTHORIZATION),
            [format!("Bearer {VALID_API_KEY}")]
        );
    }

    #[test]
    fn test_authorization_header_sent_verbatim() {
        let mut sc = scripted("text/plain", "");
        sc.with_authorization_header("Basic YWRtaW46YWRtaW4=")
            .fake_req("GET", "/")
            .exec();
        assert_eq!(
            header_values(sc.req().unwrap(), AUTHORIZATION),
            ["Basic YWRtaW46YWRtaW4="]
        );
    }

    #[test]
    fn test_api_key_and_header_both_attached() {
        let mut sc = scripted("text/plain", "");
        sc.with_valid_api_key()
            .with_authorization_header("Token abc")
            .with_token_session_cookie("tok")
            .fake_req("GET", "/")
            .exec();
        let req = sc.req().unwrap();
        assert_eq!(
            header_values(req, AUTHORIZATION),
            [format!("Bearer {VALID_API_KEY}"), "Token abc".to_string()]
        );
        assert_eq!(header_values(req, COOKIE), ["brrtr_session=tok"]);
    }

    #[test]
    fn test_session_cookie_uses_configured_name() {
        let mut sc = ScenarioContext::builder()
            .config(HarnessConfig::default().login_cookie_name("grafana_session"))
            .router(Arc::new(|_w: &mut dyn ResponseWriter, _r: &HttpRequest| {}))
            .build();
        sc.with_token_session_cookie("raw token=value")
            .fake_req("GET", "/")
            .exec();
        assert_eq!(
            header_values(sc.req().unwrap(), COOKIE),
            ["grafana_session=raw token=value"]
        );
    }

    #[test]
    fn test_no_credentials_no_headers() {
        let mut sc = scripted("text/plain", "");
        sc.fake_req("GET", "/").exec();
        let req = sc.req().unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert!(req.headers().get(COOKIE).is_none());
    }

    #[test]
    fn test_fake_req_with_params_round_trips() {
        let mut sc = scripted("text/plain", "");
        sc.fake_req_with_params("GET", "/x", [("a", "1"), ("b", "2")]);
        let query = sc.req().unwrap().uri().query().unwrap();
        let mut parsed: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        parsed.sort();
        assert_eq!(
            parsed,
            [("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
        assert_eq!(sc.url(), "/x");
        assert_eq!(sc.method(), Some(&Method::GET));
        assert_eq!(sc.query_params().len(), 2);
    }

    #[test]
    fn test_json_response_decoded() {
        let mut sc = scripted(JSON_CONTENT_TYPE, r#"{"ok":true}"#);
        sc.fake_req("GET", "/").exec();
        let json = sc.resp_json().unwrap();
        assert_eq!(json.len(), 1);
        assert_eq!(json["ok"], Value::Bool(true));
    }

    #[test]
    fn test_text_response_not_decoded() {
        let mut sc = scripted("text/plain", r#"{"ok":true}"#);
        sc.fake_req("GET", "/").exec();
        assert!(sc.resp_json().is_none());
        assert_eq!(sc.resp().body_string(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_json_content_type_must_match_exactly() {
        let mut sc = scripted("application/json", r#"{"ok":true}"#);
        sc.fake_req("GET", "/").exec();
        assert!(sc.resp_json().is_none());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let mut sc = scripted(JSON_CONTENT_TYPE, r#"{"ok":"#);
        sc.fake_req("GET", "/");
        assert!(matches!(sc.try_exec(), Err(ScenarioError::InvalidJsonBody(_))));
    }

    #[test]
    #[should_panic(expected = "scenario exec failed")]
    fn test_malformed_json_fails_test() {
        let mut sc = scripted(JSON_CONTENT_TYPE, r#"{"ok":"#);
        sc.fake_req("GET", "/").exec();
    }

    #[test]
    fn test_json_null_leaves_map_unset() {
        let mut sc = scripted(JSON_CONTENT_TYPE, "null");
        sc.fake_req("GET", "/").exec();
        assert!(sc.resp_json().is_none());
        assert_eq!(sc.resp().body_string(), "null");
    }

    #[test]
    fn test_json_array_is_error() {
        let mut sc = scripted(JSON_CONTENT_TYPE, "[1]");
        sc.fake_req("GET", "/");
        assert!(matches!(sc.try_exec(), Err(ScenarioError::InvalidJsonBody(_))));
    }

    #[test]
    fn test_empty_json_body_is_error() {
        let mut sc = scripted(JSON_CONTENT_TYPE, "");
        sc.fake_req("GET", "/");
        assert!(matches!(sc.try_exec(), Err(ScenarioError::EmptyJsonBody)));
    }

    #[test]
    #[should_panic(expected = "fake_req")]
    fn test_bad_method_fails_test() {
        let mut sc = scripted("text/plain", "");
        sc.fake_req("BAD METHOD", "/");
    }

    #[test]
    fn test_bad_url_is_error() {
        let mut sc = scripted("text/plain", "");
        assert!(matches!(
            sc.try_fake_req_with_params("GET", "http://bad host/", [("a", "1")]),
            Err(ScenarioError::InvalidUrl { .. })
        ));
        assert!(sc.req().is_none());
    }

    #[test]
    fn test_exec_requires_request() {
        let mut sc = scripted("text/plain", "");
        assert!(matches!(sc.try_exec(), Err(ScenarioError::RequestNotBuilt)));
    }

    #[test]
    fn test_exec_is_single_use() {
        let mut sc = scripted("text/plain", "hi");
        sc.fake_req("GET", "/").exec();
        assert!(matches!(sc.try_exec(), Err(ScenarioError::AlreadyExecuted)));
        assert_eq!(sc.resp().body_string(), "hi");
    }

    #[test]
    fn test_invalid_authorization_value_is_error() {
        let mut sc = scripted("text/plain", "");
        sc.with_authorization_header("bad\r\nvalue").fake_req("GET", "/");
        assert!(matches!(
            sc.try_exec(),
            Err(ScenarioError::InvalidHeader { name: "authorization", .. })
        ));
    }

    #[test]
    fn test_failed_exec_leaves_request_untouched() {
        let mut sc = scripted("text/plain", "");
        sc.with_valid_api_key()
            .with_authorization_header("bad\r\nvalue")
            .with_token_session_cookie("tok")
            .fake_req("GET", "/");
        assert!(sc.try_exec().is_err());
        let req = sc.req().unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert!(req.headers().get(COOKIE).is_none());

        sc.with_authorization_header("Token ok").exec();
        assert_eq!(
            header_values(sc.req().unwrap(), AUTHORIZATION),
            [format!("Bearer {VALID_API_KEY}"), "Token ok".to_string()]
        );
        assert_eq!(header_values(sc.req().unwrap(), COOKIE), ["brrtr_session=tok"]);
    }

    #[test]
    fn test_default_handler_without_handler_under_test() {
        let slot = HandlerSlot::default();
        let capture = ContextCapture::default();
        let mut router = Router::new();
        router
            .handle_fn(Method::GET, "/", default_handler(slot.clone(), capture.clone()))
            .unwrap();
        let mut sc = ScenarioContext::builder()
            .router(Arc::new(router))
            .handler_slot(slot)
            .capture(capture)
            .build();
        sc.fake_req("GET", "/").exec();
        assert_eq!(sc.resp().status(), StatusCode::OK);
        assert_eq!(sc.resp_json().unwrap()["message"], "OK");
        assert_eq!(sc.context().unwrap().path, "/");
        assert!(sc.handler_fn().is_none());
    }
}
