//! Inventory store: company-owned categories, products, purchases and sales.
//!
//! One generic [`RecordStore`] contract serves all four record kinds. Every
//! call carries the owner, and a record outside the caller's scope behaves
//! exactly like a missing one.

pub mod in_memory;
pub mod postgres;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockdesk_core::UserId;
use stockdesk_inventory::OwnedRecord;

pub use crate::store::StoreError;
pub use in_memory::InMemoryRecordStore;
pub use postgres::{PgRecord, PostgresRecordStore};
pub use service::{InventoryError, InventoryService, InventoryStores, InventorySummary};

/// Data-access contract for one kind of owned record.
#[async_trait]
pub trait RecordStore<T: OwnedRecord>: Send + Sync {
    /// All of `owner`'s records, ordered by id.
    async fn list(&self, owner: UserId) -> Result<Vec<T>, StoreError>;

    async fn get(&self, owner: UserId, id: T::Id) -> Result<Option<T>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] if the record's unique key is
    /// already used by another of `owner`'s records.
    async fn insert(&self, owner: UserId, draft: T::Draft, now: DateTime<Utc>) -> Result<T, StoreError>;

    /// `None` when `id` does not exist in `owner`'s scope.
    async fn update(
        &self,
        owner: UserId,
        id: T::Id,
        draft: T::Draft,
        now: DateTime<Utc>,
    ) -> Result<Option<T>, StoreError>;

    /// `false` when `id` does not exist in `owner`'s scope.
    async fn delete(&self, owner: UserId, id: T::Id) -> Result<bool, StoreError>;

    async fn count(&self, owner: UserId) -> Result<u64, StoreError>;
}

#[async_trait]
impl<T, S> RecordStore<T> for Arc<S>
where
    T: OwnedRecord,
    S: RecordStore<T> + ?Sized,
{
    async fn list(&self, owner: UserId) -> Result<Vec<T>, StoreError> {
        (**self).list(owner).await
    }

    async fn get(&self, owner: UserId, id: T::Id) -> Result<Option<T>, StoreError> {
        (**self).get(owner, id).await
    }

    async fn insert(&self, owner: UserId, draft: T::Draft, now: DateTime<Utc>) -> Result<T, StoreError> {
        (**self).insert(owner, draft, now).await
    }

    async fn update(
        &self,
        owner: UserId,
        id: T::Id,
        draft: T::Draft,
        now: DateTime<Utc>,
    ) -> Result<Option<T>, StoreError> {
        (**self).update(owner, id, draft, now).await
    }

    async fn delete(&self, owner: UserId, id: T::Id) -> Result<bool, StoreError> {
        (**self).delete(owner, id).await
    }

    async fn count(&self, owner: UserId) -> Result<u64, StoreError> {
        (**self).count(owner).await
    }
}
