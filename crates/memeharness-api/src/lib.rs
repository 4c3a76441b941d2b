//! Endpoint clients for the remote meme service.
//!
//! `AuthSession` owns the token lifecycle; `MemesClient` wraps the CRUD
//! endpoints. Both are thin layers over the executor in
//! `memeharness-http`: one executor call per operation, statuses returned
//! as data.

pub mod auth;
pub mod memes;
pub mod types;

pub use auth::{AuthError, AuthSession};
pub use memes::MemesClient;
pub use types::{AuthPayload, Meme, MemePayload};
