use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockdesk_auth::{NewAccount, Role, UserAccount};
use stockdesk_core::UserId;

use super::{AccountRepository, StoreError};

/// In-memory account store for tests/dev.
///
/// Ids start at 1 and are never reused. Writes are serialized by the lock,
/// which also makes the username uniqueness check atomic with the insert.
#[derive(Debug)]
pub struct InMemoryAccountRepository {
    inner: RwLock<Accounts>,
}

#[derive(Debug)]
struct Accounts {
    by_id: BTreeMap<UserId, UserAccount>,
    next_id: i64,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Accounts {
                by_id: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let accounts = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts.by_id.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let accounts = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts
            .by_id
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<UserAccount>, StoreError> {
        let accounts = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts
            .by_id
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let accounts = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts.by_id.values().any(|a| a.username == username))
    }

    async fn insert(&self, account: NewAccount) -> Result<UserAccount, StoreError> {
        let mut accounts = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if accounts.by_id.values().any(|a| a.username == account.username) {
            return Err(StoreError::UsernameTaken(account.username));
        }

        let id = UserId::new(accounts.next_id);
        accounts.next_id += 1;

        let stored = UserAccount {
            id,
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            active: account.active,
            created_at: Utc::now(),
        };
        accounts.by_id.insert(id, stored.clone());
        Ok(stored)
    }

    async fn save(&self, account: &UserAccount) -> Result<UserAccount, StoreError> {
        let mut accounts = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let existing = accounts
            .by_id
            .get_mut(&account.id)
            .ok_or(StoreError::Missing(account.id))?;

        existing.active = account.active;
        existing.password_hash = account.password_hash.clone();
        Ok(existing.clone())
    }
}
