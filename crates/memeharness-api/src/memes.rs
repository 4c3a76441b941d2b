//! Thin clients for the meme CRUD endpoints.
//!
//! Each method maps to exactly one executor call with a fixed method/path
//! template. Status codes come back as data for the caller to assert on.

use memeharness_http::{ApiRequest, ApiResponse, Executor, HttpError};

/// Client for the `/meme` resource.
#[derive(Debug, Clone)]
pub struct MemesClient {
    executor: Executor,
}

impl MemesClient {
    /// Create a client sharing the executor's session state.
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Fetch all meme records with `GET /meme`.
    pub async fn list(&self) -> Result<ApiResponse, HttpError> {
        tracing::debug!("get all memes");
        self.executor.execute(ApiRequest::get("/meme")).await
    }

    /// Fetch one record with `GET /meme/{id}`.
    pub async fn get(&self, id: i64) -> Result<ApiResponse, HttpError> {
        tracing::debug!(id, "get meme by id");
        self.executor
            .execute(ApiRequest::get(format!("/meme/{id}")))
            .await
    }

    /// Create a record with `POST /meme`.
    pub async fn create(&self, payload: &serde_json::Value) -> Result<ApiResponse, HttpError> {
        tracing::debug!("create meme");
        self.executor
            .execute(ApiRequest::post("/meme").json(payload.clone()))
            .await
    }

    /// Update a record with `PUT /meme/{id}`.
    pub async fn update(
        &self,
        id: i64,
        payload: &serde_json::Value,
    ) -> Result<ApiResponse, HttpError> {
        tracing::debug!(id, "update meme");
        self.executor
            .execute(ApiRequest::put(format!("/meme/{id}")).json(payload.clone()))
            .await
    }

    /// Delete a record with `DELETE /meme/{id}`.
    pub async fn delete(&self, id: i64) -> Result<ApiResponse, HttpError> {
        tracing::debug!(id, "delete meme");
        self.executor
            .execute(ApiRequest::delete(format!("/meme/{id}")))
            .await
    }
}
