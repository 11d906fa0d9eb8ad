//! Signed-in session state.
//!
//! The bearer credential and the identity record live under separate keys
//! so the HTTP layer can purge the credential without touching anything
//! else.

use std::sync::Arc;

use storefront_core::UserIdentity;
use storefront_fetch::{MemorySession, SessionVault};
use tracing::info;

use crate::kv::{KeyValueStore, keys};
use crate::persistent::PersistentStore;

/// Persisted session.
#[derive(Debug)]
pub struct SessionStore {
    token: PersistentStore<Option<String>>,
    user: PersistentStore<Option<UserIdentity>>,
}

impl SessionStore {
    /// Opens the session persisted in `kv`.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            token: PersistentStore::open(Arc::clone(&kv), keys::AUTH_TOKEN),
            user: PersistentStore::open(kv, keys::AUTH_USER),
        }
    }

    /// Stores a credential and, when known, the identity it belongs to.
    pub fn sign_in(&self, token: impl Into<String>, user: Option<UserIdentity>) {
        let token = token.into();
        let token = token.trim().to_string();
        self.token.replace(Some(token));
        if let Some(user) = &user {
            info!(user_id = user.id, "Signed in");
        } else {
            info!("Stored bearer credential");
        }
        self.user.replace(user);
    }

    /// Forgets the credential and identity.
    pub fn sign_out(&self) {
        self.token.reset();
        self.user.reset();
        info!("Signed out");
    }

    /// Identity of the signed-in user.
    pub fn user(&self) -> Option<UserIdentity> {
        self.user.get()
    }

    /// Returns true if a credential is stored.
    pub fn is_signed_in(&self) -> bool {
        self.token.read(Option::is_some)
    }
}

impl SessionVault for SessionStore {
    fn token(&self) -> Option<String> {
        self.token.get().filter(|t| !t.is_empty())
    }

    fn purge(&self) {
        self.sign_out();
    }
}

/// A process-only credential in front of the persisted session.
///
/// The override token is sent instead of the stored one and is never
/// written. A purge clears it and the persisted credential and identity.
#[derive(Debug)]
pub struct TokenOverride {
    token: MemorySession,
    stored: Arc<SessionStore>,
}

impl TokenOverride {
    /// Wraps `stored` with `token`.
    pub fn new(token: impl Into<String>, stored: Arc<SessionStore>) -> Self {
        Self {
            token: MemorySession::with_token(token.into().trim()),
            stored,
        }
    }
}

impl SessionVault for TokenOverride {
    fn token(&self) -> Option<String> {
        self.token.token().filter(|t| !t.is_empty())
    }

    fn purge(&self) {
        self.token.purge();
        self.stored.purge();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    fn identity() -> UserIdentity {
        UserIdentity {
            id: 12,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_sign_in_persists() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        SessionStore::open(kv.clone()).sign_in(" tok-1 ", Some(identity()));

        let reopened = SessionStore::open(kv);
        assert_eq!(reopened.token().as_deref(), Some("tok-1"));
        assert_eq!(reopened.user(), Some(identity()));
    }

    #[test]
    fn test_purge_erases_both_keys() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let session = SessionStore::open(kv.clone());
        session.sign_in("tok-1", Some(identity()));

        session.purge();

        assert!(!session.is_signed_in());
        assert_eq!(session.user(), None);
        assert_eq!(kv.get(keys::AUTH_TOKEN).unwrap(), None);
        assert_eq!(kv.get(keys::AUTH_USER).unwrap(), None);
    }

    #[test]
    fn test_override_token_is_sent_but_not_stored() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let stored = Arc::new(SessionStore::open(kv.clone()));
        stored.sign_in("stored-tok", Some(identity()));

        let vault = TokenOverride::new(" env-tok ", Arc::clone(&stored));

        assert_eq!(vault.token().as_deref(), Some("env-tok"));
        assert_eq!(stored.token().as_deref(), Some("stored-tok"));
    }

    #[test]
    fn test_override_purge_clears_identity() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let stored = Arc::new(SessionStore::open(kv.clone()));
        stored.sign_in("stored-tok", Some(identity()));
        let vault = TokenOverride::new("env-tok", Arc::clone(&stored));

        vault.purge();

        assert!(vault.token().is_none());
        assert!(!stored.is_signed_in());
        assert_eq!(stored.user(), None);
        assert_eq!(kv.get(keys::AUTH_USER).unwrap(), None);
    }
}
