//! Bearer credential access.
//!
//! The commerce client never owns the credential. It asks a
//! [`SessionVault`] for the current token before each request and tells it
//! to purge everything after a 401.

use std::sync::Mutex;
use tracing::debug;

/// Source of the bearer credential for API calls.
pub trait SessionVault: Send + Sync {
    /// Returns the current bearer token, if signed in.
    fn token(&self) -> Option<String>;

    /// Forgets the credential and identity record.
    fn purge(&self);
}

/// In-process session holding only a token.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: Mutex<Option<String>>,
}

impl MemorySession {
    /// Creates an anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionVault for MemorySession {
    fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn purge(&self) {
        if let Ok(mut token) = self.token.lock() {
            *token = None;
            debug!("In-memory session purged");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_purge() {
        let session = MemorySession::with_token("abc");
        assert_eq!(session.token().as_deref(), Some("abc"));
        session.purge();
        assert!(session.token().is_none());
    }
}
