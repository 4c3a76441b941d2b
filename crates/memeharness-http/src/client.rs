//! The request executor: one logical HTTP call with bounded retry and
//! response normalization.

use std::sync::Arc;
use std::time::Duration;

use memeharness_evidence::{Attachment, NullRecorder, Recorder};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, ClientBuilder};

use crate::error::{HttpError, TransportError};
use crate::request::ApiRequest;
use crate::response::{ApiResponse, BodyParser, JsonBodyParser};
use crate::retry::{next_action, AttemptOutcome, NextAction};
use crate::token::TokenStore;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout per attempt.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("memeharness/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build a configured reqwest client.
pub fn build_client(config: &HttpConfig) -> Result<Client, HttpError> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(HttpError::ClientBuild)
}

/// Executes logical API calls against a fixed base URL.
///
/// Cloning an executor shares the underlying client, token store, recorder
/// and parser, so resource clients built from clones of one executor see the
/// same session state.
#[derive(Clone)]
pub struct Executor {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    recorder: Arc<dyn Recorder>,
    parser: Arc<dyn BodyParser>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Create an executor with default config, a fresh token store, JSON
    /// body parsing and no evidence recording.
    pub fn new(base_url: impl Into<String>) -> Result<Self, HttpError> {
        ExecutorBuilder::new(base_url).build()
    }

    /// Start building an executor with overrides.
    pub fn builder(base_url: impl Into<String>) -> ExecutorBuilder {
        ExecutorBuilder::new(base_url)
    }

    /// Handle to the shared token slot.
    pub fn token_store(&self) -> TokenStore {
        self.tokens.clone()
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one logical call: issue the request, retry transient
    /// failures with linear backoff, and normalize the final response.
    ///
    /// The request's path is appended verbatim to the base URL. If the
    /// token store holds a token, its raw value is written to the
    /// `Authorization` header before every attempt, overwriting any
    /// caller-supplied value. Any HTTP status on the final attempt is
    /// returned as data; only transport-level failures become errors.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let retries = request.retries.max(1);
        let url = format!("{}{}", self.base_url, request.path);

        for attempt in 1..=retries {
            let outcome = self.attempt(&request, &url).await?;
            let failure = match &outcome {
                AttemptOutcome::ServerError(r) => format!("status {}", r.status_u16()),
                AttemptOutcome::Transient(t) => t.reason().to_string(),
                _ => String::new(),
            };

            match next_action(outcome, attempt, retries, request.backoff_base) {
                NextAction::Retry { delay } => {
                    tracing::warn!(
                        attempt,
                        retries,
                        %failure,
                        delay_ms = delay.as_millis() as u64,
                        %url,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                NextAction::Return(response) => {
                    self.record(&url, &response);
                    return Ok(response);
                }
                NextAction::Fail(error) => return Err(error),
            }
        }

        // Every branch above either returns or continues; reaching this
        // point means the loop ran out without a final outcome.
        Err(HttpError::RetriesExhausted)
    }

    /// Issue a single attempt and classify the result.
    async fn attempt(&self, request: &ApiRequest, url: &str) -> Result<AttemptOutcome, HttpError> {
        let mut headers = request.headers.clone();
        if let Some(token) = self.tokens.get() {
            let value = HeaderValue::from_str(&token.value).map_err(|_| {
                HttpError::InvalidHeader {
                    name: AUTHORIZATION.as_str().to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, %url, "sending request");

        match builder.send().await {
            Ok(response) => {
                let status = response.status();
                let headers = response.headers().clone();
                // The request timeout covers body transfer too, so a stall
                // here must be classified exactly like a send failure.
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => return Ok(classify_transport(e)),
                };
                let json = self.parser.try_parse(&headers, &body);
                let normalized = ApiResponse {
                    status,
                    headers,
                    body,
                    json,
                };
                tracing::debug!(status = status.as_u16(), %url, "received response");
                if status.is_server_error() {
                    Ok(AttemptOutcome::ServerError(normalized))
                } else {
                    Ok(AttemptOutcome::Success(normalized))
                }
            }
            Err(e) => Ok(classify_transport(e)),
        }
    }

    /// Record the final response for the audit trail. Pure side channel.
    fn record(&self, url: &str, response: &ApiResponse) {
        self.recorder.attach(Attachment::text(
            "Response",
            format!(
                "{} -> status {}\n\n{}",
                url,
                response.status_u16(),
                response.body
            ),
        ));
        if let Some(json) = response.json() {
            self.recorder.attach(Attachment::json("Response JSON", json));
        }
    }
}

/// Classify a transport failure into an attempt outcome. Timeouts and
/// connection failures are transient and eligible for retry; anything else
/// is fatal.
fn classify_transport(e: reqwest::Error) -> AttemptOutcome {
    if e.is_timeout() {
        AttemptOutcome::Transient(TransportError::Timeout(e))
    } else if e.is_connect() {
        AttemptOutcome::Transient(TransportError::Connect(e))
    } else {
        AttemptOutcome::Fatal(HttpError::Transport(e))
    }
}

/// Builder for [`Executor`] overrides.
pub struct ExecutorBuilder {
    base_url: String,
    config: HttpConfig,
    tokens: TokenStore,
    recorder: Arc<dyn Recorder>,
    parser: Arc<dyn BodyParser>,
}

impl ExecutorBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            config: HttpConfig::default(),
            tokens: TokenStore::new(),
            recorder: Arc::new(NullRecorder),
            parser: Arc::new(JsonBodyParser),
        }
    }

    /// Override the HTTP client configuration.
    pub fn config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing token store instead of creating a fresh one.
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = tokens;
        self
    }

    /// Attach an evidence recorder.
    pub fn recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Override the body-parsing strategy.
    pub fn parser(mut self, parser: Arc<dyn BodyParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Build the executor.
    pub fn build(self) -> Result<Executor, HttpError> {
        let client = build_client(&self.config)?;
        Ok(Executor {
            client,
            base_url: self.base_url,
            tokens: self.tokens,
            recorder: self.recorder,
            parser: self.parser,
        })
    }
}
