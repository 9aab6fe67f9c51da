//! Postgres-backed record stores.
//!
//! Each record kind describes its table through [`PgRecord`]; the SQL for
//! the shared CRUD shape is derived from that description. Per-owner
//! uniqueness is enforced by unique indexes, and a violation maps to
//! `StoreError::Duplicate`. Amounts are stored as minor units (`BIGINT`).

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::{info, instrument};

use stockdesk_core::{CategoryId, ProductId, PurchaseId, SaleId, UserId};
use stockdesk_inventory::{Category, Money, OwnedRecord, Product, Purchase, Sale};

use super::{RecordStore, StoreError};
use crate::store::map_sqlx_error;

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Table mapping for a record kind.
pub trait PgRecord: OwnedRecord {
    const TABLE: &'static str;

    /// DDL statements, run in order by `migrate`.
    const SCHEMA: &'static [&'static str];

    /// Writable columns, in the order [`PgRecord::bind_fields`] binds them.
    const FIELDS: &'static [&'static str];

    fn bind_fields<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

pub struct PostgresRecordStore<T> {
    pool: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgresRecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: PgRecord> PostgresRecordStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    /// Create the record table and its indexes if they do not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in T::SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        info!(table = T::TABLE, "schema ready");
        Ok(())
    }

    fn duplicate(record: &T) -> StoreError {
        StoreError::Duplicate {
            kind: T::KIND,
            key: record.unique_key().unwrap_or_default(),
        }
    }
}

fn insert_sql(table: &str, fields: &[&str]) -> String {
    let columns = fields.join(", ");
    let placeholders = (2..fields.len() + 2)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let created = fields.len() + 2;
    let updated = fields.len() + 3;
    format!(
        "INSERT INTO {table} (owner_id, {columns}, created_at, updated_at) \
         VALUES ($1, {placeholders}, ${created}, ${updated}) RETURNING *"
    )
}

fn update_sql(table: &str, fields: &[&str]) -> String {
    let assignments = fields
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{field} = ${}", i + 3))
        .collect::<Vec<_>>()
        .join(", ");
    let updated = fields.len() + 3;
    format!(
        "UPDATE {table} SET {assignments}, updated_at = ${updated} \
         WHERE owner_id = $1 AND id = $2 RETURNING *"
    )
}

fn corrupt(e: sqlx::Error) -> StoreError {
    StoreError::Corrupt(e.to_string())
}

#[async_trait]
impl<T: PgRecord> RecordStore<T> for PostgresRecordStore<T> {
    #[instrument(skip_all, fields(kind = T::KIND, owner = %owner), err)]
    async fn list(&self, owner: UserId) -> Result<Vec<T>, StoreError> {
        let rows = sqlx::query(&format!("SELECT * FROM {} WHERE owner_id = $1 ORDER BY id ASC", T::TABLE))
            .bind(owner.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(|row| T::from_row(row).map_err(corrupt)).collect()
    }

    #[instrument(skip_all, fields(kind = T::KIND, owner = %owner), err)]
    async fn get(&self, owner: UserId, id: T::Id) -> Result<Option<T>, StoreError> {
        let raw_id: i64 = id.into();
        let row = sqlx::query(&format!("SELECT * FROM {} WHERE owner_id = $1 AND id = $2", T::TABLE))
            .bind(owner.get())
            .bind(raw_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| T::from_row(&r).map_err(corrupt)).transpose()
    }

    #[instrument(skip_all, fields(kind = T::KIND, owner = %owner), err)]
    async fn insert(&self, owner: UserId, draft: T::Draft, now: DateTime<Utc>) -> Result<T, StoreError> {
        // The database assigns the real id; this value only carries the fields.
        let pending = T::create(T::Id::from(0_i64), owner, draft, now);
        let sql = insert_sql(T::TABLE, T::FIELDS);

        let query = sqlx::query(&sql).bind(owner.get());
        let result = pending
            .bind_fields(query)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => T::from_row(&row).map_err(corrupt),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(Self::duplicate(&pending)),
            Err(e) => Err(map_sqlx_error("insert", e)),
        }
    }

    #[instrument(skip_all, fields(kind = T::KIND, owner = %owner), err)]
    async fn update(
        &self,
        owner: UserId,
        id: T::Id,
        draft: T::Draft,
        now: DateTime<Utc>,
    ) -> Result<Option<T>, StoreError> {
        let pending = T::create(id, owner, draft, now);
        let sql = update_sql(T::TABLE, T::FIELDS);
        let raw_id: i64 = id.into();

        let query = sqlx::query(&sql).bind(owner.get()).bind(raw_id);
        let result = pending.bind_fields(query).bind(now).fetch_optional(&self.pool).await;

        match result {
            Ok(row) => row.map(|r| T::from_row(&r).map_err(corrupt)).transpose(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(Self::duplicate(&pending)),
            Err(e) => Err(map_sqlx_error("update", e)),
        }
    }

    #[instrument(skip_all, fields(kind = T::KIND, owner = %owner), err)]
    async fn delete(&self, owner: UserId, id: T::Id) -> Result<bool, StoreError> {
        let raw_id: i64 = id.into();
        let result = sqlx::query(&format!("DELETE FROM {} WHERE owner_id = $1 AND id = $2", T::TABLE))
            .bind(owner.get())
            .bind(raw_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip_all, fields(kind = T::KIND, owner = %owner), err)]
    async fn count(&self, owner: UserId) -> Result<u64, StoreError> {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {} WHERE owner_id = $1", T::TABLE))
            .bind(owner.get())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        let n: i64 = row.try_get("n").map_err(corrupt)?;
        Ok(n.max(0) as u64)
    }
}

fn money_column(row: &PgRow, column: &str) -> Result<Money, sqlx::Error> {
    let minor: i64 = row.try_get(column)?;
    Money::from_minor(minor).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl PgRecord for Category {
    const TABLE: &'static str = "categories";

    const SCHEMA: &'static [&'static str] = &[
        "CREATE TABLE IF NOT EXISTS categories (
            id         BIGSERIAL PRIMARY KEY,
            owner_id   BIGINT      NOT NULL,
            name       TEXT        NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE UNIQUE INDEX IF NOT EXISTS categories_owner_name_key ON categories (owner_id, lower(name))",
    ];

    const FIELDS: &'static [&'static str] = &["name"];

    fn bind_fields<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(&self.name)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Category {
            id: CategoryId::new(row.try_get("id")?),
            owner: UserId::new(row.try_get("owner_id")?),
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl PgRecord for Product {
    const TABLE: &'static str = "products";

    const SCHEMA: &'static [&'static str] = &[
        "CREATE TABLE IF NOT EXISTS products (
            id          BIGSERIAL PRIMARY KEY,
            owner_id    BIGINT      NOT NULL,
            category_id BIGINT      NOT NULL,
            name        TEXT        NOT NULL,
            sku         TEXT        NOT NULL,
            price_minor BIGINT      NOT NULL CHECK (price_minor >= 0),
            qty         BIGINT      NOT NULL CHECK (qty >= 0),
            description TEXT        NOT NULL DEFAULT '',
            created_at  TIMESTAMPTZ NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL
        )",
        "CREATE UNIQUE INDEX IF NOT EXISTS products_owner_sku_key ON products (owner_id, upper(sku))",
        "CREATE INDEX IF NOT EXISTS products_owner_category_idx ON products (owner_id, category_id)",
    ];

    const FIELDS: &'static [&'static str] = &["category_id", "name", "sku", "price_minor", "qty", "description"];

    fn bind_fields<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.category_id.get())
            .bind(&self.name)
            .bind(&self.sku)
            .bind(self.price.minor())
            .bind(self.qty)
            .bind(&self.desc)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            owner: UserId::new(row.try_get("owner_id")?),
            category_id: CategoryId::new(row.try_get("category_id")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: money_column(row, "price_minor")?,
            qty: row.try_get("qty")?,
            desc: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

macro_rules! impl_trade_pg {
    ($record:ident, $id:ident, $table:literal) => {
        impl PgRecord for $record {
            const TABLE: &'static str = $table;

            const SCHEMA: &'static [&'static str] = &[
                concat!(
                    "CREATE TABLE IF NOT EXISTS ",
                    $table,
                    " (
                    id          BIGSERIAL PRIMARY KEY,
                    owner_id    BIGINT      NOT NULL,
                    item        TEXT        NOT NULL,
                    qty         BIGINT      NOT NULL CHECK (qty > 0),
                    price_minor BIGINT      NOT NULL CHECK (price_minor >= 0),
                    total_minor BIGINT      NOT NULL CHECK (total_minor >= 0),
                    created_at  TIMESTAMPTZ NOT NULL,
                    updated_at  TIMESTAMPTZ NOT NULL
                )"
                ),
                concat!("CREATE INDEX IF NOT EXISTS ", $table, "_owner_idx ON ", $table, " (owner_id)"),
            ];

            const FIELDS: &'static [&'static str] = &["item", "qty", "price_minor", "total_minor"];

            fn bind_fields<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
                query
                    .bind(&self.item)
                    .bind(self.qty)
                    .bind(self.price.minor())
                    .bind(self.total.minor())
            }

            fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
                Ok($record {
                    id: $id::new(row.try_get("id")?),
                    owner: UserId::new(row.try_get("owner_id")?),
                    item: row.try_get("item")?,
                    qty: row.try_get("qty")?,
                    price: money_column(row, "price_minor")?,
                    total: money_column(row, "total_minor")?,
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                })
            }
        }
    };
}

impl_trade_pg!(Purchase, PurchaseId, "purchases");
impl_trade_pg!(Sale, SaleId, "sales");

#[cfg(test)]
mod tests {
    use super::*;
    use stockdesk_inventory::{CategoryDraft, ProductDraft, TradeDraft};

    #[test]
    fn insert_sql_numbers_placeholders_after_owner() {
        assert_eq!(
            insert_sql("categories", Category::FIELDS),
            "INSERT INTO categories (owner_id, name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4) RETURNING *"
        );
        assert!(insert_sql("sales", Sale::FIELDS).contains("VALUES ($1, $2, $3, $4, $5, $6, $7)"));
    }

    #[test]
    fn update_sql_scopes_by_owner_and_id() {
        assert_eq!(
            update_sql("categories", Category::FIELDS),
            "UPDATE categories SET name = $3, updated_at = $4 \
             WHERE owner_id = $1 AND id = $2 RETURNING *"
        );
        let sql = update_sql("products", Product::FIELDS);
        assert!(sql.contains("description = $8, updated_at = $9"));
    }

    async fn pool_from_env() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        Some(PgPool::connect(&url).await.expect("connect to DATABASE_URL"))
    }

    /// Owners unlikely to collide with rows left behind by earlier runs.
    fn fresh_owner() -> UserId {
        UserId::new(Utc::now().timestamp_micros())
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn category_rows_round_trip_and_stay_scoped() {
        let Some(pool) = pool_from_env().await else { return };
        let store = PostgresRecordStore::<Category>::new(pool);
        store.migrate().await.unwrap();

        let owner = fresh_owner();
        let other = UserId::new(owner.get() + 1);
        let now = Utc::now();

        let tools = store.insert(owner, CategoryDraft::new("Tools").unwrap(), now).await.unwrap();
        assert_eq!(tools.owner, owner);
        assert_eq!(tools.name, "Tools");

        let err = store
            .insert(owner, CategoryDraft::new("TOOLS").unwrap(), now)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { kind: "category", .. }));

        // Same name under another owner is fine.
        store.insert(other, CategoryDraft::new("Tools").unwrap(), now).await.unwrap();

        assert!(store.get(other, tools.id).await.unwrap().is_none());
        assert!(store.update(other, tools.id, CategoryDraft::new("X").unwrap(), now).await.unwrap().is_none());
        assert!(!store.delete(other, tools.id).await.unwrap());

        let renamed = store
            .update(owner, tools.id, CategoryDraft::new("Hand tools").unwrap(), now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Hand tools");
        assert_eq!(store.count(owner).await.unwrap(), 1);

        assert!(store.delete(owner, tools.id).await.unwrap());
        assert_eq!(store.count(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn money_columns_survive_a_round_trip() {
        let Some(pool) = pool_from_env().await else { return };
        let products = PostgresRecordStore::<Product>::new(pool.clone());
        let sales = PostgresRecordStore::<Sale>::new(pool);
        products.migrate().await.unwrap();
        sales.migrate().await.unwrap();

        let owner = fresh_owner();
        let now = Utc::now();
        let price = Money::from_major(12.34).unwrap();

        let draft = ProductDraft::new(CategoryId::new(1), "Hammer", "HM-01", price, 5, Some("steel")).unwrap();
        let hammer = products.insert(owner, draft, now).await.unwrap();
        let fetched = products.get(owner, hammer.id).await.unwrap().unwrap();
        assert_eq!(fetched.price, price);
        assert_eq!(fetched.desc, "steel");

        let sale = sales.insert(owner, TradeDraft::new("Hammer", 3, price).unwrap(), now).await.unwrap();
        assert_eq!(sale.total.minor(), 3702);
        assert_eq!(sales.list(owner).await.unwrap(), vec![sale]);
    }
}
