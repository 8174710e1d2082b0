use super::recorder::ResponseWriter;
use super::request::HeaderVec;
use crate::fixtures::{JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// Body produced by a handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    /// Serialized as JSON and labelled `application/json; charset=UTF-8`
    Json(Value),
    /// Labelled `text/plain; charset=utf-8`
    Text(String),
    /// Written as-is; the handler sets its own content type
    Raw(Vec<u8>),
}

/// Response data produced by a handler or a short-circuiting middleware
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: ResponseBody,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new(200, HeaderVec::new(), ResponseBody::Empty)
    }
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, HeaderVec::new(), ResponseBody::Json(body))
    }

    /// JSON error body of the form `{"message": ...}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "message": message }))
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, HeaderVec::new(), ResponseBody::Text(body.into()))
    }

    /// Raw bytes under an explicit content type.
    #[must_use]
    pub fn raw(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut resp = Self::new(status, HeaderVec::new(), ResponseBody::Raw(body.into()));
        resp.set_header("content-type", content_type.to_string());
        resp
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Write a handler response into `w`.
///
/// Headers set by the handler win over the default content type of the body kind.
pub fn write_handler_response(w: &mut dyn ResponseWriter, resp: HandlerResponse) {
    let (default_type, bytes) = match resp.body {
        ResponseBody::Empty => (None, Vec::new()),
        ResponseBody::Json(value) => match serde_json::to_vec(&value) {
            Ok(bytes) => (Some(JSON_CONTENT_TYPE), bytes),
            Err(e) => {
                error!(error = %e, "Failed to serialize JSON response body");
                write_internal_error(w);
                return;
            }
        },
        ResponseBody::Text(s) => (Some(TEXT_CONTENT_TYPE), s.into_bytes()),
        ResponseBody::Raw(bytes) => (None, bytes),
    };

    let headers = w.headers_mut();
    for (name, value) in &resp.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }
    if let Some(ct) = default_type {
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
    }

    let status = StatusCode::from_u16(resp.status).unwrap_or_else(|_| {
        warn!(status = resp.status, "Handler returned invalid status code");
        StatusCode::INTERNAL_SERVER_ERROR
    });
    w.write_header(status);
    if !bytes.is_empty() {
        w.write(&bytes);
    }
}

fn write_internal_error(w: &mut dyn ResponseWriter) {
    w.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    w.write_header(StatusCode::INTERNAL_SERVER_ERROR);
    w.write(br#"{"message":"Internal server error"}"#);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ResponseRecorder;
    use serde_json::json;

    #[test]
    fn test_json_body_labelled() {
        let mut rec = ResponseRecorder::new();
        write_handler_response(&mut rec, HandlerResponse::json(201, json!({"id": 7})));
        assert_eq!(rec.status(), StatusCode::CREATED);
        assert_eq!(rec.content_type(), Some(JSON_CONTENT_TYPE));
        assert_eq!(rec.body_string(), r#"{"id":7}"#);
    }

    #[test]
    fn test_text_body_labelled() {
        let mut rec = ResponseRecorder::new();
        write_handler_response(&mut rec, HandlerResponse::text(200, "pong"));
        assert_eq!(rec.content_type(), Some(TEXT_CONTENT_TYPE));
        assert_eq!(rec.body_string(), "pong");
    }

    #[test]
    fn test_handler_content_type_wins() {
        let mut rec = ResponseRecorder::new();
        let mut resp = HandlerResponse::json(200, json!([]));
        resp.set_header("Content-Type", "application/problem+json".to_string());
        write_handler_response(&mut rec, resp);
        assert_eq!(rec.content_type(), Some("application/problem+json"));
    }

    #[test]
    fn test_empty_body_keeps_status() {
        let mut rec = ResponseRecorder::new();
        write_handler_response(&mut rec, HandlerResponse::new(204, HeaderVec::new(), ResponseBody::Empty));
        assert_eq!(rec.status(), StatusCode::NO_CONTENT);
        assert!(rec.content_type().is_none());
    }

    #[test]
    fn test_invalid_status_becomes_500() {
        let mut rec = ResponseRecorder::new();
        write_handler_response(&mut rec, HandlerResponse::text(42, "x"));
        assert_eq!(rec.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut resp = HandlerResponse::default();
        resp.set_header("X-Trace", "a".to_string());
        resp.set_header("x-trace", "b".to_string());
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("X-TRACE"), Some("b"));
    }
}
