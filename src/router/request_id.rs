use crate::server::HandlerResponse;
use http::HeaderMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

/// Header carrying the request id in and out of the router.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-dispatch correlation id (ULID).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Id from an incoming `X-Request-ID`, or a fresh one when absent or not a ULID.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok());
        match incoming.map(str::parse::<RequestId>) {
            Some(Ok(id)) => id,
            Some(Err(_)) => {
                debug!(header = ?incoming, "Ignoring malformed request id");
                Self::new()
            }
            None => Self::new(),
        }
    }

    /// Echo the id on `resp` unless the handler already set one.
    pub fn stamp(&self, resp: &mut HandlerResponse) {
        if resp.get_header(REQUEST_ID_HEADER).is_none() {
            resp.set_header(REQUEST_ID_HEADER, self.to_string());
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_incoming_id_is_reused() {
        let id = RequestId::new();
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(RequestId::from_headers(&headers), id);
    }

    #[test]
    fn test_malformed_id_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("not-a-ulid"));
        let id = RequestId::from_headers(&headers);
        assert_ne!(id.to_string(), "not-a-ulid");
    }

    #[test]
    fn test_stamp_keeps_handler_id() {
        let mut resp = HandlerResponse::default();
        resp.set_header(REQUEST_ID_HEADER, "mine".to_string());
        RequestId::new().stamp(&mut resp);
        assert_eq!(resp.get_header(REQUEST_ID_HEADER), Some("mine"));

        let mut fresh = HandlerResponse::default();
        let id = RequestId::new();
        id.stamp(&mut fresh);
        assert_eq!(fresh.get_header(REQUEST_ID_HEADER), Some(id.to_string().as_str()));
    }
}
