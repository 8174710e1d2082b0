use crate::context::{HandlerFn, ReqContext};
use crate::error::RouterError;
use crate::middleware::Middleware;
use crate::server::request::{collect_headers, parse_cookies, parse_query_params};
use crate::server::{write_handler_response, HandlerResponse, HttpRequest, ResponseWriter};
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::request_id::RequestId;
use super::serve::ServeHttp;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage; names are shared with the route table.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of matching a request path to a registered route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Pattern the route was registered with (e.g. `/api/users/{id}`)
    pub pattern: Arc<str>,
    /// Path parameters extracted from the URL (`{id}` -> `("id", "123")`)
    pub path_params: ParamVec,
    route_index: usize,
}

impl RouteMatch {
    /// Get a path parameter by name (last write wins)
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    method: Method,
    pattern: Arc<str>,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    handler: HandlerFn,
}

/// In-process router: method + path pattern -> handler, wrapped in a middleware chain.
///
/// Routes are tried in registration order; the first match wins. Unmatched requests
/// go to the not-found handler, which answers `404 {"message":"Not found"}` unless
/// replaced with [`Router::set_not_found`].
///
/// ```rust
/// use brrtrouter_testkit::router::Router;
/// use brrtrouter_testkit::server::build_request;
///
/// let mut router = Router::new();
/// router
///     .get("/api/users/{id}", |c| {
///         let id = c.get_path_param("id").unwrap_or_default().to_string();
///         c.json_ok(&serde_json::json!({ "id": id }));
///     })
///     .unwrap();
///
/// let req = build_request("GET", "/api/users/42", [("a", "1")]).unwrap();
/// let (_ctx, resp) = router.dispatch(&req);
/// assert_eq!(resp.status, 200);
/// ```
pub struct Router {
    routes: Vec<Route>,
    middlewares: Vec<Arc<dyn Middleware>>,
    not_found: HandlerFn,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            middlewares: Vec::new(),
            not_found: Arc::new(|c: &mut ReqContext| c.json_api_error(404, "Not found")),
        }
    }

    /// Register `handler` for `method` requests matching `pattern`.
    pub fn handle_fn(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerFn,
    ) -> Result<&mut Self, RouterError> {
        let (regex, param_names) =
            Self::path_to_regex(pattern).map_err(|source| RouterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        debug!(method = %method, pattern = %pattern, params = ?param_names, "Route registered");
        self.routes.push(Route {
            method,
            pattern: Arc::from(pattern),
            regex,
            param_names,
            handler,
        });
        Ok(self)
    }

    pub fn handle<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&mut ReqContext) + Send + Sync + 'static,
    {
        self.handle_fn(method, pattern, Arc::new(handler))
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&mut ReqContext) + Send + Sync + 'static,
    {
        self.handle(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&mut ReqContext) + Send + Sync + 'static,
    {
        self.handle(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&mut ReqContext) + Send + Sync + 'static,
    {
        self.handle(Method::PUT, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&mut ReqContext) + Send + Sync + 'static,
    {
        self.handle(Method::DELETE, pattern, handler)
    }

    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(mw);
        self
    }

    pub fn set_not_found(&mut self, handler: HandlerFn) -> &mut Self {
        self.not_found = handler;
        self
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Find the first route registered for `method` whose pattern matches `path`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        for (index, route) in self.routes.iter().enumerate() {
            if route.method != *method {
                continue;
            }
            if let Some(captures) = route.regex.captures(path) {
                let mut params = ParamVec::new();
                for (i, name) in route.param_names.iter().enumerate() {
                    if let Some(val) = captures.get(i + 1) {
                        params.push((Arc::clone(name), val.as_str().to_string()));
                    }
                }
                debug!(
                    method = %method,
                    path = %path,
                    route_pattern = %route.pattern,
                    path_params = ?params,
                    "Route matched"
                );
                return Some(RouteMatch {
                    pattern: Arc::clone(&route.pattern),
                    path_params: params,
                    route_index: index,
                });
            }
        }
        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Run `req` through the middleware chain and matched handler.
    ///
    /// Returns the request context as the handler left it, and the final response.
    pub fn dispatch(&self, req: &HttpRequest) -> (ReqContext, HandlerResponse) {
        let path = req.uri().path();
        let request_id = RequestId::from_headers(req.headers());

        let mut ctx = ReqContext::new(request_id, req.method().clone(), path);
        ctx.headers = collect_headers(req.headers());
        ctx.cookies = parse_cookies(req.headers());
        ctx.query_params = parse_query_params(req.uri().query());

        let handler = match self.match_route(req.method(), path) {
            Some(m) => {
                ctx.path_params = m.path_params;
                self.routes
                    .get(m.route_index)
                    .map(|r| Arc::clone(&r.handler))
                    .unwrap_or_else(|| Arc::clone(&self.not_found))
            }
            None => Arc::clone(&self.not_found),
        };

        let start = Instant::now();
        let mut early_resp: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            let resp = mw.before(&mut ctx);
            if early_resp.is_none() {
                early_resp = resp;
            }
        }

        let mut resp = match early_resp {
            Some(r) => {
                debug!(request_id = %ctx.request_id, status = r.status, "Middleware short-circuited request");
                r
            }
            None => {
                handler(&mut ctx);
                ctx.take_response().unwrap_or_default()
            }
        };
        let latency = start.elapsed();

        for mw in &self.middlewares {
            mw.after(&ctx, &mut resp, latency);
        }
        ctx.request_id.stamp(&mut resp);

        (ctx, resp)
    }

    /// Convert a path pattern to an anchored regex and collect parameter names.
    ///
    /// `/users/{id}/posts` becomes `^/users/([^/]+)/posts$` with params `["id"]`.
    /// Static segments are matched literally.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 5);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
                pattern.push_str("/([^/]+)");
                param_names.push(Arc::from(&segment[1..segment.len() - 1]));
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}

impl ServeHttp for Router {
    fn serve_http(&self, w: &mut dyn ResponseWriter, req: &HttpRequest) {
        let (_ctx, resp) = self.dispatch(req);
        write_handler_response(w, resp);
    }
}
