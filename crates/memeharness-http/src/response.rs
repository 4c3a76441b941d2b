//! Normalized responses and body-parsing strategies.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;

/// A final HTTP response, normalized for assertion.
///
/// Produced once per logical call, whatever the status code. 4xx and 5xx
/// responses are valid outcomes here, never errors.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status of the final attempt.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body text, always available.
    pub body: String,
    /// Parsed body, present iff the content type indicated JSON and the
    /// body parsed cleanly.
    pub json: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Status code as a plain integer, for assertion messages.
    pub fn status_u16(&self) -> u16 {
        self.status.as_u16()
    }

    /// Parsed JSON body, if any.
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    /// Deserialize the parsed body into a typed value.
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.json
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Strategy for turning a raw body into a structured value.
///
/// Parsing is best-effort: a `None` means the body stays raw-only, it is
/// never an error.
pub trait BodyParser: Send + Sync {
    /// Attempt to parse `body` given the response headers.
    fn try_parse(&self, headers: &HeaderMap, body: &str) -> Option<serde_json::Value>;
}

/// Parses bodies whose `Content-Type` mentions `application/json`.
///
/// The match is a case-insensitive substring check, so parameterized values
/// like `application/json; charset=utf-8` qualify. Parse failures and
/// non-JSON content types produce diagnostics, not errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBodyParser;

impl BodyParser for JsonBodyParser {
    fn try_parse(&self, headers: &HeaderMap, body: &str) -> Option<serde_json::Value> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.to_lowercase().contains("application/json") {
            tracing::debug!(content_type, "response content type is not JSON");
            return None;
        }

        match serde_json::from_str(body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("response declared JSON but failed to parse: {}", e);
                None
            }
        }
    }
}

/// No-op strategy: every body stays raw-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawBodyParser;

impl BodyParser for RawBodyParser {
    fn try_parse(&self, _headers: &HeaderMap, _body: &str) -> Option<serde_json::Value> {
        None
    }
}
