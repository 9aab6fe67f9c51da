//! Identity store: persistent user accounts.
//!
//! Services depend on the [`AccountRepository`] trait only; the backend is
//! picked at startup (in-memory for tests/dev, Postgres otherwise).

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use stockdesk_auth::{NewAccount, Role, UserAccount};
use stockdesk_core::UserId;

pub use crate::store::StoreError;
pub use in_memory::InMemoryAccountRepository;
pub use postgres::PostgresAccountRepository;

/// Data-access contract for user accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError>;

    /// All accounts holding `role`, ordered by id.
    async fn find_by_role(&self, role: Role) -> Result<Vec<UserAccount>, StoreError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;

    /// Insert a new account; the store assigns `id` and `created_at`.
    ///
    /// Fails with [`StoreError::UsernameTaken`] if the username exists.
    async fn insert(&self, account: NewAccount) -> Result<UserAccount, StoreError>;

    /// Persist the mutable fields (`active`, `password_hash`) of an existing account.
    async fn save(&self, account: &UserAccount) -> Result<UserAccount, StoreError>;
}

#[async_trait]
impl<S> AccountRepository for Arc<S>
where
    S: AccountRepository + ?Sized,
{
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<UserAccount>, StoreError> {
        (**self).find_by_role(role).await
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        (**self).exists_by_username(username).await
    }

    async fn insert(&self, account: NewAccount) -> Result<UserAccount, StoreError> {
        (**self).insert(account).await
    }

    async fn save(&self, account: &UserAccount) -> Result<UserAccount, StoreError> {
        (**self).save(account).await
    }
}
