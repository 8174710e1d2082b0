//! Request fabrication and response capture.

pub mod recorder;
pub mod request;
pub mod response;

pub use recorder::{ResponseRecorder, ResponseWriter};
pub use request::{
    add_cookie, append_query, build_request, merged_cookie, parse_cookies, parse_query_params, HeaderVec,
    HttpRequest, MAX_INLINE_HEADERS,
};
pub use response::{write_handler_response, HandlerResponse, ResponseBody};
