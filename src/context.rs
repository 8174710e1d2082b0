//! # Request Context
//!
//! [`ReqContext`] is what a handler sees for one dispatched request: the parsed
//! request, identity filled in by middleware, and a response slot the handler writes
//! into. The router renders the slot into the response writer once the handler and
//! middleware have run.
//!
//! ```rust
//! use brrtrouter_testkit::context::ReqContext;
//! use serde_json::json;
//!
//! fn whoami(c: &mut ReqContext) {
//!     match c.signed_in_user.clone() {
//!         Some(user) => c.json_ok(&json!({ "login": user.login })),
//!         None => c.json_api_error(401, "Unauthorized"),
//!     }
//! }
//! ```

use crate::fakes::UserToken;
use crate::router::RequestId;
use crate::router::ParamVec;
use crate::server::{HandlerResponse, HeaderVec, ResponseBody};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

/// Handler-under-test: processes a request by writing into its context.
pub type HandlerFn = Arc<dyn Fn(&mut ReqContext) + Send + Sync>;

/// Identity attached to a request by authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInUser {
    pub user_id: i64,
    pub org_id: i64,
    pub login: String,
    /// Set when the request authenticated with an API key rather than a user session
    pub api_key_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ReqContext {
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    /// Request headers (lowercase names)
    pub headers: HeaderVec,
    pub cookies: HeaderVec,
    pub signed_in_user: Option<SignedInUser>,
    /// Session token resolved from the login cookie, if any
    pub user_token: Option<UserToken>,
    pub is_signed_in: bool,
    response: Option<HandlerResponse>,
}

impl ReqContext {
    #[must_use]
    pub fn new(request_id: RequestId, method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id,
            method,
            path: path.into(),
            path_params: ParamVec::new(),
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            signed_in_user: None,
            user_token: None,
            is_signed_in: false,
            response: None,
        }
    }

    /// Get a path parameter by name (last write wins)
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name (last write wins)
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, in request order (case-insensitive).
    pub fn get_header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of a header (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Mark the request as authenticated.
    pub fn sign_in(&mut self, user: SignedInUser) {
        self.signed_in_user = Some(user);
        self.is_signed_in = true;
    }

    /// Response written so far, if any.
    #[must_use]
    pub fn response(&self) -> Option<&HandlerResponse> {
        self.response.as_ref()
    }

    #[must_use]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Hand the written response to the router.
    pub fn take_response(&mut self) -> Option<HandlerResponse> {
        self.response.take()
    }

    /// Replace the pending response, keeping headers set earlier that `resp` does not override.
    pub fn respond(&mut self, mut resp: HandlerResponse) {
        if let Some(prev) = self.response.take() {
            for (name, value) in prev.headers {
                if resp.get_header(&name).is_none() {
                    resp.headers.push((name, value));
                }
            }
        }
        self.response = Some(resp);
    }

    /// Serialize `body` as JSON. Serialization failures become a 500.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, body: &T) {
        match serde_json::to_value(body) {
            Ok(value) => self.respond(HandlerResponse::json(status, value)),
            Err(e) => {
                error!(request_id = %self.request_id, error = %e, "Failed to serialize response");
                self.respond(HandlerResponse::error(500, "Internal server error"));
            }
        }
    }

    pub fn json_ok<T: Serialize + ?Sized>(&mut self, body: &T) {
        self.json(200, body);
    }

    /// `{"message": message}` with the given status.
    pub fn json_api_error(&mut self, status: u16, message: &str) {
        self.respond(HandlerResponse::error(status, message));
    }

    pub fn text(&mut self, status: u16, body: impl Into<String>) {
        self.respond(HandlerResponse::text(status, body));
    }

    pub fn raw(&mut self, status: u16, content_type: &str, body: impl Into<Vec<u8>>) {
        self.respond(HandlerResponse::raw(status, content_type, body));
    }

    /// Status with no body.
    pub fn status(&mut self, status: u16) {
        self.respond(HandlerResponse::new(status, HeaderVec::new(), ResponseBody::Empty));
    }

    /// Set a header on the pending response, creating an empty 200 response if needed.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.response
            .get_or_insert_with(HandlerResponse::default)
            .set_header(name, value.into());
    }

    /// JSON view of the request, handy as an echo body in scenarios.
    #[must_use]
    pub fn describe(&self) -> Value {
        let pairs = |v: &[(Arc<str>, String)]| {
            v.iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                .collect::<serde_json::Map<_, _>>()
        };
        serde_json::json!({
            "requestId": self.request_id.to_string(),
            "method": self.method.as_str(),
            "path": self.path,
            "pathParams": pairs(self.path_params.as_slice()),
            "query": pairs(self.query_params.as_slice()),
            "isSignedIn": self.is_signed_in,
            "user": self.signed_in_user,
        })
    }
}
