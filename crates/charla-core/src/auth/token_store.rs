//! The token store: in-memory identity state backed by a durable vault.
//!
//! Holds the access/refresh pair and the current user. The pair is always
//! whole: either both tokens are present or neither. `set_tokens` and
//! `clear` update the durable copy first, then the in-memory copy, so both
//! are consistent by the time the call returns.
//!
//! An expired token is not refreshed automatically; `is_valid` simply turns
//! false and the next authenticated call fails fast.

use std::sync::{Mutex, PoisonError};

use charla_types::error::StorageError;
use charla_types::identity::{StoredAuth, TokenPair, User};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::auth::claims::token_valid_at;
use crate::gateway::BearerSource;
use crate::storage::AuthVault;

/// Credential and identity state, shared behind an `Arc` between the
/// orchestrator and the HTTP gateway.
pub struct TokenStore<V: AuthVault> {
    vault: V,
    state: Mutex<Option<StoredAuth>>,
}

impl<V: AuthVault> TokenStore<V> {
    pub fn new(vault: V) -> Self {
        Self {
            vault,
            state: Mutex::new(None),
        }
    }

    /// Populate the in-memory copy from the vault. Called once at startup.
    pub async fn load(&self) -> Result<(), StorageError> {
        let stored = self.vault.load().await?;
        if let Some(auth) = &stored {
            debug!(username = %auth.user.username, "Restored persisted identity");
        }
        *self.lock() = stored;
        Ok(())
    }

    /// Install a fresh token pair and user, replacing any previous identity
    /// wholesale.
    pub async fn set_tokens(&self, tokens: TokenPair, user: User) -> Result<(), StorageError> {
        let auth = StoredAuth { tokens, user };
        self.vault.store(&auth).await?;
        *self.lock() = Some(auth);
        Ok(())
    }

    /// Drop the identity from both the vault and memory.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.vault.clear().await?;
        *self.lock() = None;
        Ok(())
    }

    /// Whether a non-expired access token is currently held.
    ///
    /// Decode failure or a missing token means invalid; this never errors
    /// toward the caller.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// [`is_valid`](Self::is_valid) against an explicit clock, for tests and
    /// deterministic callers.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.lock().as_ref() {
            Some(auth) => token_valid_at(&auth.tokens.access, now),
            None => false,
        }
    }

    /// The current user, when one is logged in.
    pub fn current_user(&self) -> Option<User> {
        self.lock().as_ref().map(|auth| auth.user.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredAuth>> {
        // A poisoned lock only means a panic elsewhere; the state itself is
        // a plain Option and stays usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: AuthVault> BearerSource for TokenStore<V> {
    /// The access token for the `Authorization: Bearer` header, or `None`
    /// when no valid token exists so callers can merge it unconditionally.
    fn bearer(&self) -> Option<String> {
        let state = self.lock();
        let auth = state.as_ref()?;
        if token_valid_at(&auth.tokens.access, Utc::now()) {
            Some(auth.tokens.access.clone())
        } else {
            warn!("Access token expired; request will go out unauthenticated");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::tests::token_with_exp;
    use chrono::Duration;
    use std::sync::Mutex as StdMutex;

    /// Vault kept in a plain mutex, mimicking durable storage.
    #[derive(Default)]
    struct MemoryVault {
        slot: StdMutex<Option<StoredAuth>>,
    }

    impl AuthVault for MemoryVault {
        async fn load(&self) -> Result<Option<StoredAuth>, StorageError> {
            Ok(self.slot.lock().unwrap().clone())
        }

        async fn store(&self, auth: &StoredAuth) -> Result<(), StorageError> {
            *self.slot.lock().unwrap() = Some(auth.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), StorageError> {
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }

    fn test_user() -> User {
        User {
            id: 1,
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    fn fresh_pair() -> TokenPair {
        TokenPair {
            access: token_with_exp(Utc::now().timestamp() + 3600),
            refresh: "refresh".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_store_is_invalid() {
        let store = TokenStore::new(MemoryVault::default());
        assert!(!store.is_valid());
        assert!(store.bearer().is_none());
        assert!(store.current_user().is_none());
    }

    #[tokio::test]
    async fn test_set_tokens_then_valid() {
        let store = TokenStore::new(MemoryVault::default());
        store.set_tokens(fresh_pair(), test_user()).await.unwrap();
        assert!(store.is_valid());
        assert!(store.bearer().is_some());
        assert_eq!(store.current_user().unwrap().username, "ana");
    }

    #[tokio::test]
    async fn test_expired_token_invalid_and_no_bearer() {
        let store = TokenStore::new(MemoryVault::default());
        let pair = TokenPair {
            access: token_with_exp(Utc::now().timestamp() - 10),
            refresh: "refresh".to_string(),
        };
        store.set_tokens(pair, test_user()).await.unwrap();
        assert!(!store.is_valid());
        assert!(store.bearer().is_none());
        // Identity is still loaded; only validity changed.
        assert!(store.current_user().is_some());
    }

    #[tokio::test]
    async fn test_validity_boundary() {
        let store = TokenStore::new(MemoryVault::default());
        let now = Utc::now();
        let pair = TokenPair {
            access: token_with_exp(now.timestamp() + 1),
            refresh: "refresh".to_string(),
        };
        store.set_tokens(pair, test_user()).await.unwrap();
        assert!(store.is_valid_at(now));
        assert!(!store.is_valid_at(now + Duration::seconds(1)));
    }

    #[tokio::test]
    async fn test_clear_removes_identity() {
        let store = TokenStore::new(MemoryVault::default());
        store.set_tokens(fresh_pair(), test_user()).await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.is_valid());
        assert!(store.current_user().is_none());
    }

    #[tokio::test]
    async fn test_load_restores_from_vault() {
        let vault = MemoryVault::default();
        vault
            .store(&StoredAuth {
                tokens: fresh_pair(),
                user: test_user(),
            })
            .await
            .unwrap();

        let store = TokenStore::new(vault);
        assert!(store.current_user().is_none());
        store.load().await.unwrap();
        assert!(store.is_valid());
        assert_eq!(store.current_user().unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_garbage_access_token_fails_closed() {
        let store = TokenStore::new(MemoryVault::default());
        let pair = TokenPair {
            access: "garbage".to_string(),
            refresh: "refresh".to_string(),
        };
        store.set_tokens(pair, test_user()).await.unwrap();
        assert!(!store.is_valid());
        assert!(store.bearer().is_none());
    }
}
