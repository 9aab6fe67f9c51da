//! Inventory service: per-company CRUD over the four record stores, plus the
//! dashboard summary.
//!
//! Every operation takes the owning company's id; callers resolve it from
//! the authenticated principal. Records of other companies are reported as
//! not found, never as forbidden.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use stockdesk_core::{CategoryId, Entity, ProductId, PurchaseId, SaleId, UserId};
use stockdesk_inventory::{Category, CategoryDraft, OwnedRecord, Product, ProductDraft, Purchase, Sale, TradeDraft};

use super::{InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("{0}")]
    Duplicate(String),

    #[error("category {0} does not exist")]
    UnknownCategory(CategoryId),

    #[error("category {0} still has products")]
    CategoryInUse(CategoryId),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for InventoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { .. } => InventoryError::Duplicate(e.to_string()),
            other => InventoryError::Store(other),
        }
    }
}

/// Per-company record counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventorySummary {
    pub categories: u64,
    pub products: u64,
    pub purchases: u64,
    pub sales: u64,
}

#[derive(Clone)]
pub struct InventoryStores {
    pub categories: Arc<dyn RecordStore<Category>>,
    pub products: Arc<dyn RecordStore<Product>>,
    pub purchases: Arc<dyn RecordStore<Purchase>>,
    pub sales: Arc<dyn RecordStore<Sale>>,
}

impl InventoryStores {
    pub fn in_memory() -> Self {
        Self {
            categories: Arc::new(InMemoryRecordStore::new()),
            products: Arc::new(InMemoryRecordStore::new()),
            purchases: Arc::new(InMemoryRecordStore::new()),
            sales: Arc::new(InMemoryRecordStore::new()),
        }
    }

    /// Postgres stores over `pool`; tables are created if missing.
    pub async fn postgres(pool: PgPool) -> Result<Self, StoreError> {
        let categories = PostgresRecordStore::<Category>::new(pool.clone());
        let products = PostgresRecordStore::<Product>::new(pool.clone());
        let purchases = PostgresRecordStore::<Purchase>::new(pool.clone());
        let sales = PostgresRecordStore::<Sale>::new(pool);

        categories.migrate().await?;
        products.migrate().await?;
        purchases.migrate().await?;
        sales.migrate().await?;

        Ok(Self {
            categories: Arc::new(categories),
            products: Arc::new(products),
            purchases: Arc::new(purchases),
            sales: Arc::new(sales),
        })
    }
}

pub struct InventoryService {
    stores: InventoryStores,
}

impl InventoryService {
    pub fn new(stores: InventoryStores) -> Self {
        Self { stores }
    }

    pub async fn summary(&self, owner: UserId) -> Result<InventorySummary, InventoryError> {
        Ok(InventorySummary {
            categories: self.stores.categories.count(owner).await?,
            products: self.stores.products.count(owner).await?,
            purchases: self.stores.purchases.count(owner).await?,
            sales: self.stores.sales.count(owner).await?,
        })
    }

    // Categories

    pub async fn list_categories(&self, owner: UserId) -> Result<Vec<Category>, InventoryError> {
        Ok(self.stores.categories.list(owner).await?)
    }

    pub async fn create_category(&self, owner: UserId, draft: CategoryDraft) -> Result<Category, InventoryError> {
        let category = self.stores.categories.insert(owner, draft, Utc::now()).await?;
        info!(owner = %owner, category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        owner: UserId,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, InventoryError> {
        update_in(&*self.stores.categories, owner, id, draft).await
    }

    /// Refused while any of the company's products still reference it.
    pub async fn delete_category(&self, owner: UserId, id: CategoryId) -> Result<(), InventoryError> {
        let in_use = self
            .stores
            .products
            .list(owner)
            .await?
            .iter()
            .any(|p| p.category_id == id);
        if in_use {
            return Err(InventoryError::CategoryInUse(id));
        }
        delete_in(&*self.stores.categories, owner, id).await
    }

    // Products

    pub async fn list_products(&self, owner: UserId) -> Result<Vec<Product>, InventoryError> {
        Ok(self.stores.products.list(owner).await?)
    }

    pub async fn create_product(&self, owner: UserId, draft: ProductDraft) -> Result<Product, InventoryError> {
        self.ensure_category(owner, draft.category_id).await?;
        let product = self.stores.products.insert(owner, draft, Utc::now()).await?;
        info!(owner = %owner, product_id = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        owner: UserId,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, InventoryError> {
        self.ensure_category(owner, draft.category_id).await?;
        update_in(&*self.stores.products, owner, id, draft).await
    }

    pub async fn delete_product(&self, owner: UserId, id: ProductId) -> Result<(), InventoryError> {
        delete_in(&*self.stores.products, owner, id).await
    }

    // Purchases

    pub async fn list_purchases(&self, owner: UserId) -> Result<Vec<Purchase>, InventoryError> {
        Ok(self.stores.purchases.list(owner).await?)
    }

    pub async fn create_purchase(&self, owner: UserId, draft: TradeDraft) -> Result<Purchase, InventoryError> {
        let purchase = self.stores.purchases.insert(owner, draft, Utc::now()).await?;
        info!(owner = %owner, purchase_id = %purchase.id, total = %purchase.total, "purchase recorded");
        Ok(purchase)
    }

    pub async fn update_purchase(
        &self,
        owner: UserId,
        id: PurchaseId,
        draft: TradeDraft,
    ) -> Result<Purchase, InventoryError> {
        update_in(&*self.stores.purchases, owner, id, draft).await
    }

    pub async fn delete_purchase(&self, owner: UserId, id: PurchaseId) -> Result<(), InventoryError> {
        delete_in(&*self.stores.purchases, owner, id).await
    }

    // Sales

    pub async fn list_sales(&self, owner: UserId) -> Result<Vec<Sale>, InventoryError> {
        Ok(self.stores.sales.list(owner).await?)
    }

    pub async fn create_sale(&self, owner: UserId, draft: TradeDraft) -> Result<Sale, InventoryError> {
        let sale = self.stores.sales.insert(owner, draft, Utc::now()).await?;
        info!(owner = %owner, sale_id = %sale.id, total = %sale.total, "sale recorded");
        Ok(sale)
    }

    pub async fn update_sale(&self, owner: UserId, id: SaleId, draft: TradeDraft) -> Result<Sale, InventoryError> {
        update_in(&*self.stores.sales, owner, id, draft).await
    }

    pub async fn delete_sale(&self, owner: UserId, id: SaleId) -> Result<(), InventoryError> {
        delete_in(&*self.stores.sales, owner, id).await
    }

    async fn ensure_category(&self, owner: UserId, id: CategoryId) -> Result<(), InventoryError> {
        match self.stores.categories.get(owner, id).await? {
            Some(_) => Ok(()),
            None => Err(InventoryError::UnknownCategory(id)),
        }
    }
}

async fn update_in<T: OwnedRecord>(
    store: &dyn RecordStore<T>,
    owner: UserId,
    id: T::Id,
    draft: T::Draft,
) -> Result<T, InventoryError> {
    let record = store
        .update(owner, id, draft, Utc::now())
        .await?
        .ok_or_else(|| not_found::<T>(id))?;
    info!(owner = %owner, kind = T::KIND, id = ?record.id(), "record updated");
    Ok(record)
}

async fn delete_in<T: OwnedRecord>(store: &dyn RecordStore<T>, owner: UserId, id: T::Id) -> Result<(), InventoryError> {
    if !store.delete(owner, id).await? {
        return Err(not_found::<T>(id));
    }
    info!(owner = %owner, kind = T::KIND, id = ?id, "record deleted");
    Ok(())
}

fn not_found<T: OwnedRecord>(id: T::Id) -> InventoryError {
    InventoryError::NotFound {
        kind: T::KIND,
        id: id.into(),
    }
}
