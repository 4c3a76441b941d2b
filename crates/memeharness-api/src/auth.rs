//! Authorization session: obtain, hold and validate the shared bearer
//! token.

use memeharness_http::{ApiRequest, ApiResponse, AuthToken, Executor, HttpError, TokenStore};

/// Authorization failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The service reported success but the body carried no usable token.
    #[error("authorize response contained no token")]
    MissingToken,

    #[error(transparent)]
    Http(#[from] HttpError),
}

/// Session owning the executor's token slot.
///
/// The session is the only component that writes the token; the executor
/// and every resource client built from it read the same slot. Constructing
/// one session per test run (instead of process-global state) keeps
/// parallel runs from racing on each other's credentials.
#[derive(Debug, Clone)]
pub struct AuthSession {
    executor: Executor,
    tokens: TokenStore,
}

impl AuthSession {
    /// Create a session over the executor's token store.
    pub fn new(executor: Executor) -> Self {
        let tokens = executor.token_store();
        Self { executor, tokens }
    }

    /// Request a token via `POST /authorize`.
    ///
    /// On a success status the `token` field is extracted from the parsed
    /// body and stored, replacing any previous token; a success response
    /// without a usable token is a fatal [`AuthError::MissingToken`]. Any
    /// non-success status is returned untouched with token state unchanged,
    /// so negative tests can assert on the 400.
    pub async fn authorize(&self, payload: &serde_json::Value) -> Result<ApiResponse, AuthError> {
        tracing::debug!("requesting authorization token");
        let response = self
            .executor
            .execute(ApiRequest::post("/authorize").json(payload.clone()))
            .await?;

        if response.status.is_success() {
            let token = response
                .json()
                .and_then(|body| body.get("token"))
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .ok_or(AuthError::MissingToken)?
                .to_string();

            let issued_for = payload
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or_default()
                .to_string();

            tracing::info!(%issued_for, "authorization token issued");
            self.tokens.set(AuthToken::new(token, issued_for));
        }

        Ok(response)
    }

    /// Probe token liveness via `GET /authorize/{token}`.
    ///
    /// Never mutates session state; the negative suite feeds this arbitrary
    /// malformed token values.
    pub async fn is_alive(&self, token: &str) -> Result<ApiResponse, AuthError> {
        tracing::debug!("checking token liveness");
        let response = self
            .executor
            .execute(ApiRequest::get(format!("/authorize/{token}")))
            .await?;
        Ok(response)
    }

    /// Session-scoped reuse policy: keep a live token, replace a dead one.
    ///
    /// If a token is already held and its liveness probe returns 200 it is
    /// reused; otherwise a fresh token is requested for `name`.
    pub async fn ensure_authorized(&self, name: &str) -> Result<AuthToken, AuthError> {
        if let Some(held) = self.tokens.get() {
            let probe = self.is_alive(&held.value).await?;
            if probe.status.is_success() {
                tracing::debug!("reusing live token");
                return Ok(held);
            }
            tracing::debug!("held token is dead, re-authorizing");
        }

        self.authorize(&serde_json::json!({ "name": name })).await?;
        self.tokens.get().ok_or(AuthError::MissingToken)
    }

    /// Currently held token, if any.
    pub fn token(&self) -> Option<AuthToken> {
        self.tokens.get()
    }
}
