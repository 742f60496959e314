//! Session token capability
//!
//! The bearer token is the only credential the client keeps. It is injected
//! wherever it is needed instead of living in a process-wide singleton.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;

/// Durable home of the session token
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current token, `None` when logged out
    async fn token(&self) -> Result<Option<String>>;

    async fn save_token(&self, token: &str) -> Result<()>;

    /// Remove the token; a no-op when none is stored
    async fn clear(&self) -> Result<()>;

    async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.token().await?.is_some_and(|t| !t.is_empty()))
    }
}

/// Process-local store, for tests and short-lived tools
#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn token(&self) -> Result<Option<String>> {
        Ok(self.token.lock().clone())
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.lock() = None;
        Ok(())
    }
}
