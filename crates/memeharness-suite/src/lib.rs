//! End-to-end test suite wiring for the meme service.
//!
//! Provides the fixed configuration, tracing setup, the mock service used
//! for hermetic runs, and the [`Harness`] bundle the tests construct once
//! per run.

pub mod config;
pub mod logging;
pub mod service;

use std::sync::Arc;

use memeharness_api::{AuthError, AuthSession, MemesClient};
use memeharness_evidence::Recorder;
use memeharness_http::{Executor, HttpError};

pub use service::MockMemeService;

/// One test run's worth of clients sharing a single session.
#[derive(Debug, Clone)]
pub struct Harness {
    /// The underlying executor (exposed for ad-hoc requests in tests).
    pub executor: Executor,
    /// Authorization session owning the token slot.
    pub auth: AuthSession,
    /// Meme CRUD client.
    pub memes: MemesClient,
}

impl Harness {
    /// Wire a harness against `base_url` with no evidence recording.
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        logging::init();
        let executor = Executor::new(base_url)?;
        Ok(Self::from_executor(executor))
    }

    /// Wire a harness with an evidence recorder attached.
    pub fn with_recorder(base_url: &str, recorder: Arc<dyn Recorder>) -> Result<Self, HttpError> {
        logging::init();
        let executor = Executor::builder(base_url).recorder(recorder).build()?;
        Ok(Self::from_executor(executor))
    }

    fn from_executor(executor: Executor) -> Self {
        let auth = AuthSession::new(executor.clone());
        let memes = MemesClient::new(executor.clone());
        Self {
            executor,
            auth,
            memes,
        }
    }

    /// Authorize as the suite user, reusing a live token when held.
    pub async fn login(&self) -> Result<(), AuthError> {
        self.auth.ensure_authorized(config::USERNAME).await?;
        Ok(())
    }
}
