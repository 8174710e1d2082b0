//! # Fixtures
//!
//! Static values shared by every scenario: the API key fixture, the exact JSON
//! content type the harness decodes, and helpers for the API key format.
//!
//! ## API Key Format
//!
//! API keys are base64-encoded JSON objects:
//!
//! ```text
//! {"k":"<secret>","n":"<key name>","id":<org id>}
//! ```
//!
//! [`VALID_API_KEY`] decodes to secret `v5nAwpMafFP6znaS4urhdWDLS5511M42`, name
//! `asd` and org id `1`. A middleware under test that accepts API keys can decode the
//! bearer value with [`ApiKeyFixture::decode`] and compare the secret against its own
//! store.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// API key attached by `ScenarioContext::with_valid_api_key`.
pub const VALID_API_KEY: &str =
    "eyJrIjoidjVuQXdwTWFmRlA2em5hUzR1cmhkV0RMUzU1MTFNNDIiLCJuIjoiYXNkIiwiaWQiOjF9";

/// Content type a response must carry, byte for byte, for the harness to decode it.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Content type used for plain text handler responses.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Errors produced while decoding an API key.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("api key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("api key payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded form of an API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyFixture {
    /// Secret part of the key
    #[serde(rename = "k")]
    pub secret: String,
    /// Human readable key name
    #[serde(rename = "n")]
    pub name: String,
    /// Organisation the key belongs to
    #[serde(rename = "id")]
    pub org_id: i64,
}

impl ApiKeyFixture {
    pub fn new(secret: impl Into<String>, name: impl Into<String>, org_id: i64) -> Self {
        Self {
            secret: secret.into(),
            name: name.into(),
            org_id,
        }
    }

    /// Decode a base64 API key into its parts.
    pub fn decode(key: &str) -> Result<Self, FixtureError> {
        let bytes = general_purpose::STANDARD.decode(key.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Encode into the wire form used in `Authorization: Bearer <key>`.
    pub fn encode(&self) -> Result<String, FixtureError> {
        let json = serde_json::to_vec(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }
}
