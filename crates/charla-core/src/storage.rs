//! Durable client-side storage trait.
//!
//! The core persists exactly one thing: the [`StoredAuth`] blob (token pair
//! plus user object), so identity survives process restarts. Uses RPITIT
//! (native async fn in traits, Rust 2024 edition). Implementations live in
//! charla-infra.

use charla_types::error::StorageError;
use charla_types::identity::StoredAuth;

/// Narrow read/write interface over a durable key-value store.
pub trait AuthVault: Send + Sync {
    /// Load the persisted auth blob. Returns `None` when nothing is stored
    /// or the stored copy is incomplete (tokens without user, or vice versa).
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<StoredAuth>, StorageError>> + Send;

    /// Persist the auth blob, replacing any previous copy wholesale.
    fn store(
        &self,
        auth: &StoredAuth,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Remove the persisted auth blob. No-op when nothing is stored.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
