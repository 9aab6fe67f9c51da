//! Postgres-backed account store.
//!
//! Username uniqueness is enforced by the `UNIQUE(username)` constraint; a
//! unique violation (`23505`) on insert maps to `StoreError::UsernameTaken`.
//! Roles are stored in their `ROLE_*` authority spelling.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{info, instrument};

use stockdesk_auth::{NewAccount, Role, UserAccount};
use stockdesk_core::UserId;

use super::{AccountRepository, StoreError};
use crate::store::map_sqlx_error;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS user_accounts (
    id            BIGSERIAL PRIMARY KEY,
    username      TEXT        NOT NULL UNIQUE,
    password_hash TEXT        NOT NULL,
    role          TEXT        NOT NULL,
    active        BOOLEAN     NOT NULL DEFAULT TRUE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const COLUMNS: &str = "id, username, password_hash, role, active, created_at";

#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: Arc<PgPool>,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `user_accounts` table if it does not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        info!("user_accounts schema ready");
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM user_accounts WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM user_accounts WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_username", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_role(&self, role: Role) -> Result<Vec<UserAccount>, StoreError> {
        // Older rows may carry the bare role name instead of the authority.
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM user_accounts WHERE upper(role) IN ($1, $2) ORDER BY id ASC"
        ))
        .bind(role.authority())
        .bind(role.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_role", e))?;

        rows.iter().map(account_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM user_accounts WHERE username = $1) AS found")
            .bind(username)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists_by_username", e))?;

        row.try_get::<bool, _>("found")
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    #[instrument(skip(self, account), fields(username = %account.username), err)]
    async fn insert(&self, account: NewAccount) -> Result<UserAccount, StoreError> {
        let result = sqlx::query(&format!(
            "INSERT INTO user_accounts (username, password_hash, role, active) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.authority())
        .bind(account.active)
        .fetch_one(&*self.pool)
        .await;

        match result {
            Ok(row) => account_from_row(&row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::UsernameTaken(account.username))
            }
            Err(e) => Err(map_sqlx_error("insert", e)),
        }
    }

    #[instrument(skip(self, account), fields(id = %account.id), err)]
    async fn save(&self, account: &UserAccount) -> Result<UserAccount, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE user_accounts SET active = $2, password_hash = $3 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(account.id.get())
        .bind(account.active)
        .bind(&account.password_hash)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save", e))?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(StoreError::Missing(account.id)),
        }
    }
}

fn account_from_row(row: &PgRow) -> Result<UserAccount, StoreError> {
    let corrupt = |e: sqlx::Error| StoreError::Corrupt(e.to_string());

    let role: String = row.try_get("role").map_err(corrupt)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupt)?;

    Ok(UserAccount {
        id: UserId::new(row.try_get::<i64, _>("id").map_err(corrupt)?),
        username: row.try_get("username").map_err(corrupt)?,
        password_hash: row.try_get("password_hash").map_err(corrupt)?,
        role,
        active: row.try_get("active").map_err(corrupt)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repository() -> Option<PostgresAccountRepository> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
        let repo = PostgresAccountRepository::new(pool);
        repo.migrate().await.unwrap();
        Some(repo)
    }

    /// Usernames unique per run so the tests tolerate a shared database.
    fn unique(prefix: &str) -> String {
        format!("{prefix}-{}", Utc::now().timestamp_micros())
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn insert_round_trips_through_row_mapping() {
        let Some(repo) = repository().await else { return };
        let username = unique("acme");

        let inserted = repo
            .insert(NewAccount::new(&username, "hash", Role::Company).unwrap())
            .await
            .unwrap();
        let fetched = repo.find_by_username(&username).await.unwrap().unwrap();

        assert_eq!(fetched, inserted);
        assert_eq!(fetched.role, Role::Company);
        assert!(fetched.active);
        assert!(repo.exists_by_username(&username).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_username_maps_to_username_taken() {
        let Some(repo) = repository().await else { return };
        let username = unique("globex");

        repo.insert(NewAccount::new(&username, "hash", Role::Company).unwrap())
            .await
            .unwrap();
        let err = repo
            .insert(NewAccount::new(&username, "other", Role::Company).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::UsernameTaken(u) if u == username));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn find_by_role_accepts_legacy_role_spellings() {
        let Some(repo) = repository().await else { return };
        let username = unique("legacy");

        sqlx::query("INSERT INTO user_accounts (username, password_hash, role) VALUES ($1, 'hash', 'company')")
            .bind(&username)
            .execute(&*repo.pool)
            .await
            .unwrap();

        let companies = repo.find_by_role(Role::Company).await.unwrap();
        let legacy = companies
            .iter()
            .find(|a| a.username == username)
            .expect("legacy row listed");
        assert_eq!(legacy.role, Role::Company);

        let admins = repo.find_by_role(Role::Admin).await.unwrap();
        assert!(admins.iter().all(|a| a.username != username));
    }
}
