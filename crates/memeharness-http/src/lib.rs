//! Resilient HTTP request execution for memeharness.
//!
//! The executor issues one logical call at a time against a fixed base URL,
//! retries transient failures (5xx responses, timeouts, connection
//! failures) with linear backoff, and normalizes the final response for
//! assertion. Status codes are never converted into errors: the suite
//! validates the service's status contract, so every final response is
//! handed back as data.

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod retry;
pub mod token;

pub use client::{build_client, Executor, ExecutorBuilder, HttpConfig};
pub use error::{HttpError, TransportError};
pub use request::ApiRequest;
pub use response::{ApiResponse, BodyParser, JsonBodyParser, RawBodyParser};
pub use retry::{next_action, AttemptOutcome, NextAction};
pub use token::{AuthToken, TokenStore};
