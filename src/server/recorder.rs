use http::header::{HeaderMap, CONTENT_TYPE};
use http::StatusCode;

/// Sink a router writes its response into.
pub trait ResponseWriter {
    /// Headers to send; mutations after `write_header` have no effect on a real socket.
    fn headers_mut(&mut self) -> &mut HeaderMap;
    /// Commit the status code. Only the first call counts.
    fn write_header(&mut self, status: StatusCode);
    /// Append body bytes, committing a `200 OK` status if none was written.
    fn write(&mut self, buf: &[u8]);
}

/// In-memory response capture standing in for a network socket.
#[derive(Debug, Clone)]
pub struct ResponseRecorder {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    wrote_header: bool,
}

impl Default for ResponseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            wrote_header: false,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn wrote_header(&self) -> bool {
        self.wrote_header
    }
}

impl ResponseWriter for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.wrote_header {
            return;
        }
        self.status = status;
        self.wrote_header = true;
    }

    fn write(&mut self, buf: &[u8]) {
        if !self.wrote_header {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
    }
}
