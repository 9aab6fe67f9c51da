use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockdesk_core::{Entity, UserId};
use stockdesk_inventory::OwnedRecord;

use super::{RecordStore, StoreError};

/// In-memory record store for tests/dev.
///
/// Ids are global across owners, start at 1 and are never reused. The write
/// lock makes the uniqueness check atomic with the write.
pub struct InMemoryRecordStore<T> {
    inner: RwLock<Records<T>>,
}

struct Records<T> {
    by_id: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: OwnedRecord> InMemoryRecordStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Records {
                by_id: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<T: OwnedRecord> Default for InMemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: OwnedRecord> Records<T> {
    fn owned(&self, owner: UserId, id: T::Id) -> Option<&T> {
        let key: i64 = id.into();
        self.by_id.get(&key).filter(|r| r.owner() == owner)
    }

    fn ensure_unique(&self, candidate: &T) -> Result<(), StoreError> {
        let Some(key) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = self.by_id.values().any(|r| {
            r.owner() == candidate.owner() && r.id() != candidate.id() && r.unique_key().as_deref() == Some(&key)
        });
        if taken {
            return Err(StoreError::Duplicate { kind: T::KIND, key });
        }
        Ok(())
    }
}

#[async_trait]
impl<T: OwnedRecord> RecordStore<T> for InMemoryRecordStore<T> {
    async fn list(&self, owner: UserId) -> Result<Vec<T>, StoreError> {
        let records = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .by_id
            .values()
            .filter(|r| r.owner() == owner)
            .cloned()
            .collect())
    }

    async fn get(&self, owner: UserId, id: T::Id) -> Result<Option<T>, StoreError> {
        let records = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.owned(owner, id).cloned())
    }

    async fn insert(&self, owner: UserId, draft: T::Draft, now: DateTime<Utc>) -> Result<T, StoreError> {
        let mut records = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let id = records.next_id;
        let record = T::create(T::Id::from(id), owner, draft, now);
        records.ensure_unique(&record)?;

        records.by_id.insert(id, record.clone());
        records.next_id += 1;
        Ok(record)
    }

    async fn update(
        &self,
        owner: UserId,
        id: T::Id,
        draft: T::Draft,
        now: DateTime<Utc>,
    ) -> Result<Option<T>, StoreError> {
        let mut records = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let Some(existing) = records.owned(owner, id) else {
            return Ok(None);
        };
        let mut revised = existing.clone();
        revised.revise(draft, now);
        records.ensure_unique(&revised)?;

        records.by_id.insert(id.into(), revised.clone());
        Ok(Some(revised))
    }

    async fn delete(&self, owner: UserId, id: T::Id) -> Result<bool, StoreError> {
        let mut records = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if records.owned(owner, id).is_none() {
            return Ok(false);
        }
        let key: i64 = id.into();
        records.by_id.remove(&key);
        Ok(true)
    }

    async fn count(&self, owner: UserId) -> Result<u64, StoreError> {
        let records = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.by_id.values().filter(|r| r.owner() == owner).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use stockdesk_core::CategoryId;
    use stockdesk_inventory::{Category, CategoryDraft};

    use super::*;

    const ACME: UserId = UserId::new(1);

    fn draft(name: &str) -> CategoryDraft {
        CategoryDraft::new(name).unwrap()
    }

    #[tokio::test]
    async fn ids_are_sequential_across_owners() {
        let store = InMemoryRecordStore::<Category>::new();
        let now = Utc::now();
        let a = store.insert(ACME, draft("Tools"), now).await.unwrap();
        let b = store.insert(UserId::new(2), draft("Tools"), now).await.unwrap();

        assert_eq!(a.id, CategoryId::new(1));
        assert_eq!(b.id, CategoryId::new(2));
    }

    #[tokio::test]
    async fn records_are_invisible_outside_their_owner() {
        let store = InMemoryRecordStore::<Category>::new();
        let now = Utc::now();
        let globex = UserId::new(2);
        let tools = store.insert(ACME, draft("Tools"), now).await.unwrap();

        assert!(store.get(globex, tools.id).await.unwrap().is_none());
        assert!(store.update(globex, tools.id, draft("Stolen"), now).await.unwrap().is_none());
        assert!(!store.delete(globex, tools.id).await.unwrap());
        assert!(store.list(globex).await.unwrap().is_empty());
        assert_eq!(store.count(globex).await.unwrap(), 0);

        assert_eq!(store.get(ACME, tools.id).await.unwrap().unwrap().name, "Tools");
        assert_eq!(store.count(ACME).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unique_keys_are_scoped_per_owner() {
        let store = InMemoryRecordStore::<Category>::new();
        let now = Utc::now();
        store.insert(ACME, draft("Tools"), now).await.unwrap();

        assert!(matches!(
            store.insert(ACME, draft("tools"), now).await,
            Err(StoreError::Duplicate { kind: "category", .. })
        ));
        assert!(store.insert(UserId::new(2), draft("Tools"), now).await.is_ok());
    }

    #[tokio::test]
    async fn update_checks_uniqueness_against_other_records_only() {
        let store = InMemoryRecordStore::<Category>::new();
        let now = Utc::now();
        let tools = store.insert(ACME, draft("Tools"), now).await.unwrap();
        let paint = store.insert(ACME, draft("Paint"), now).await.unwrap();

        let renamed = store.update(ACME, tools.id, draft("TOOLS"), now).await.unwrap().unwrap();
        assert_eq!(renamed.name, "TOOLS");
        assert!(matches!(
            store.update(ACME, paint.id, draft("tools"), now).await,
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_and_list_stays_ordered() {
        let store = InMemoryRecordStore::<Category>::new();
        let now = Utc::now();
        let a = store.insert(ACME, draft("A"), now).await.unwrap();
        store.insert(ACME, draft("B"), now).await.unwrap();
        store.insert(ACME, draft("C"), now).await.unwrap();

        assert!(store.delete(ACME, a.id).await.unwrap());
        assert!(!store.delete(ACME, a.id).await.unwrap());

        let names: Vec<_> = store.list(ACME).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["B", "C"]);
    }
}
