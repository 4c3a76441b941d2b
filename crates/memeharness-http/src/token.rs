//! Shared bearer token state.

use std::sync::Arc;

use parking_lot::RwLock;

/// Bearer credential issued by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// Opaque token value, attached verbatim to the `Authorization` header.
    pub value: String,
    /// Username the token was issued for.
    pub issued_for: String,
}

impl AuthToken {
    /// Create a token.
    pub fn new(value: impl Into<String>, issued_for: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            issued_for: issued_for.into(),
        }
    }
}

/// Shared handle to the session's token slot.
///
/// Exactly one token is live at a time; replacing it invalidates the
/// previous value for future requests. The executor only reads the slot;
/// the authorization session is the single mutator path. Cloning the store
/// shares the same slot (last writer wins).
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<AuthToken>>>,
}

impl TokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token, if one has been issued.
    pub fn get(&self) -> Option<AuthToken> {
        self.inner.read().clone()
    }

    /// Replace the live token.
    pub fn set(&self, token: AuthToken) {
        *self.inner.write() = Some(token);
    }

    /// Drop the live token.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}
