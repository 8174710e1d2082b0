use crate::server::{HttpRequest, ResponseWriter};

/// Dispatch seam the scenario harness drives: handle `req`, write the response into `w`.
///
/// Implemented by [`Router`](super::Router) and by any closure with the same shape,
/// which is how a scenario stands in a scripted server:
///
/// ```rust
/// use brrtrouter_testkit::router::ServeHttp;
/// use brrtrouter_testkit::server::{HttpRequest, ResponseRecorder, ResponseWriter, build_request};
///
/// let teapot = |w: &mut dyn ResponseWriter, _req: &HttpRequest| {
///     w.write_header(http::StatusCode::IM_A_TEAPOT);
/// };
/// let mut rec = ResponseRecorder::new();
/// let req = build_request("GET", "/", [("k", "v")]).unwrap();
/// teapot.serve_http(&mut rec, &req);
/// assert_eq!(rec.status(), http::StatusCode::IM_A_TEAPOT);
/// ```
pub trait ServeHttp: Send + Sync {
    fn serve_http(&self, w: &mut dyn ResponseWriter, req: &HttpRequest);
}

impl<F> ServeHttp for F
where
    F: Fn(&mut dyn ResponseWriter, &HttpRequest) + Send + Sync,
{
    fn serve_http(&self, w: &mut dyn ResponseWriter, req: &HttpRequest) {
        self(w, req)
    }
}
