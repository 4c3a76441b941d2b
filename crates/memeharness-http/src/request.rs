//! HTTP request description and builder.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;

/// One logical API call, immutable once handed to the executor.
///
/// `path` is appended verbatim to the executor's base URL. No slash
/// normalization is performed, matching the service contract the suite was
/// written against.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: Method,
    /// Relative path, appended verbatim to the base URL.
    pub path: String,
    /// Caller-supplied headers. `Authorization` is overwritten when a
    /// token is live.
    pub headers: HeaderMap,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
    /// Attempt bound, always at least 1.
    pub retries: u32,
    /// Base delay for linear backoff between attempts.
    pub backoff_base: Duration,
}

impl ApiRequest {
    /// Create a request with default retry policy (3 attempts, 1s backoff
    /// base).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Shorthand for a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Shorthand for a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the attempt bound. Values below 1 clamp to 1.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Set the linear backoff base.
    pub fn backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }
}
