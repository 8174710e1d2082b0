use thiserror::Error;

/// Faults in the scenario harness itself.
///
/// None of these describe the behaviour of the code under test; they mean the
/// scenario was built wrong or the response could not be captured as declared.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("invalid request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("exec called before fake_req")]
    RequestNotBuilt,

    #[error("scenario already executed; build a new scenario per request")]
    AlreadyExecuted,

    #[error("response declared JSON but body could not be decoded: {0}")]
    InvalidJsonBody(#[source] serde_json::Error),

    #[error("response declared JSON but body was empty")]
    EmptyJsonBody,
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid route pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
