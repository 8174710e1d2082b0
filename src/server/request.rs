use crate::error::ScenarioError;
use crate::router::ParamVec;
use http::header::{HeaderMap, HeaderValue, COOKIE};
use http::uri::{PathAndQuery, Uri};
use http::{Method, Request};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// Maximum inline headers/cookies before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header or cookie pairs; names are shared `Arc<str>`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request type the harness fabricates and the router consumes.
pub type HttpRequest = Request<Vec<u8>>;

/// Build a body-less request, appending `params` to the URL query string.
///
/// An empty method means `GET`. Query pairs already present in `url` are kept in front
/// of `params`; all pairs are re-encoded with `application/x-www-form-urlencoded`
/// rules in the order given.
pub fn build_request<I, K, V>(method: &str, url: &str, params: I) -> Result<HttpRequest, ScenarioError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let method = if method.is_empty() {
        Method::GET
    } else {
        Method::from_bytes(method.as_bytes())
            .map_err(|_| ScenarioError::InvalidMethod(method.to_string()))?
    };
    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| ScenarioError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let uri = append_query(uri, params)?;

    debug!(method = %method, uri = %uri, "Fake request built");

    Ok(Request::builder().method(method).uri(uri).body(Vec::new())?)
}

/// Append form-encoded pairs to the query string of `uri`.
pub fn append_query<I, K, V>(uri: Uri, params: I) -> Result<Uri, ScenarioError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut params = params.into_iter().peekable();
    if params.peek().is_none() {
        return Ok(uri);
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let Some(existing) = uri.query() {
        serializer.extend_pairs(url::form_urlencoded::parse(existing.as_bytes()));
    }
    for (k, v) in params {
        serializer.append_pair(k.as_ref(), v.as_ref());
    }
    let query = serializer.finish();

    let path_and_query = match uri.path() {
        "" => format!("/?{query}"),
        p => format!("{p}?{query}"),
    };
    let original = uri.to_string();
    let invalid = |reason: String| ScenarioError::InvalidUrl {
        url: original.clone(),
        reason,
    };

    let mut parts = uri.into_parts();
    parts.path_and_query =
        Some(PathAndQuery::try_from(path_and_query).map_err(|e| invalid(e.to_string()))?);
    Uri::from_parts(parts).map_err(|e| invalid(e.to_string()))
}

/// Add a cookie to the request, merging into an existing `Cookie` header.
pub fn add_cookie(req: &mut HttpRequest, name: &str, value: &str) -> Result<(), ScenarioError> {
    let value = merged_cookie(req, name, value)?;
    req.headers_mut().insert(COOKIE, value);
    Ok(())
}

/// `Cookie` header value `req` would carry after adding `name=value`, without touching `req`.
pub fn merged_cookie(req: &HttpRequest, name: &str, value: &str) -> Result<HeaderValue, ScenarioError> {
    let pair = format!("{name}={value}");
    let merged = match req.headers().get(COOKIE) {
        Some(existing) if !existing.is_empty() => {
            format!("{}; {pair}", String::from_utf8_lossy(existing.as_bytes()))
        }
        _ => pair,
    };
    HeaderValue::from_str(&merged).map_err(|e| ScenarioError::InvalidHeader {
        name: "cookie",
        reason: e.to_string(),
    })
}

/// Collect request headers with lowercase names.
pub fn collect_headers(headers: &HeaderMap) -> HeaderVec {
    headers
        .iter()
        .map(|(name, value)| {
            (
                Arc::from(name.as_str()),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Parse cookies from every `Cookie` header on the request.
pub fn parse_cookies(headers: &HeaderMap) -> HeaderVec {
    headers
        .get_all(COOKIE)
        .iter()
        .flat_map(|h| {
            String::from_utf8_lossy(h.as_bytes())
                .split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim();
                    if name.is_empty() {
                        return None;
                    }
                    let value = parts.next().unwrap_or("").trim().to_string();
                    Some((Arc::from(name), value))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Parse query string parameters, keeping duplicates in order.
pub fn parse_query_params(query: Option<&str>) -> ParamVec {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}
