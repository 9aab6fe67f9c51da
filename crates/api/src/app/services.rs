//! Service wiring: store selection, JWT codec, admin bootstrap.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use stockdesk_auth::{Argon2PasswordHasher, Hs256Jwt};
use stockdesk_infra::accounts::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};
use stockdesk_infra::companies::CompanyService;
use stockdesk_infra::config::AppConfig;
use stockdesk_infra::identity::IdentityService;
use stockdesk_infra::inventory::{InventoryService, InventoryStores};

pub type SharedAccounts = Arc<dyn AccountRepository>;

#[derive(Clone)]
pub struct AppServices {
    pub accounts: SharedAccounts,
    pub companies: Arc<CompanyService<SharedAccounts>>,
    pub identity: Arc<IdentityService<SharedAccounts>>,
    pub inventory: Arc<InventoryService>,
    pub jwt: Arc<Hs256Jwt>,
}

impl AppServices {
    pub fn new(accounts: SharedAccounts, inventory: InventoryStores, jwt: Arc<Hs256Jwt>) -> Self {
        let companies = Arc::new(CompanyService::new(accounts.clone()));
        let identity = Arc::new(IdentityService::new(
            accounts.clone(),
            Arc::new(Argon2PasswordHasher::default()),
            jwt.clone(),
        ));
        Self {
            accounts,
            companies,
            identity,
            inventory: Arc::new(InventoryService::new(inventory)),
            jwt,
        }
    }

    /// Services backed by in-memory stores; no bootstrap is run.
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(InMemoryAccountRepository::new()),
            InventoryStores::in_memory(),
            jwt_from_config(config),
        )
    }
}

fn jwt_from_config(config: &AppConfig) -> Arc<Hs256Jwt> {
    Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes(), config.jwt_ttl))
}

/// Build services for the running server.
///
/// `DATABASE_URL` selects Postgres (schema is created on startup); without it
/// accounts and inventory live in memory and vanish on restart.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let (accounts, inventory): (SharedAccounts, InventoryStores) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to postgres")?;
            let store = PostgresAccountRepository::new(pool.clone());
            store.migrate().await.context("failed to migrate account schema")?;
            let inventory = InventoryStores::postgres(pool)
                .await
                .context("failed to migrate inventory schema")?;
            info!("stores: postgres");
            (Arc::new(store) as SharedAccounts, inventory)
        }
        None => {
            warn!("DATABASE_URL not set; accounts and inventory are kept in memory");
            (Arc::new(InMemoryAccountRepository::new()) as SharedAccounts, InventoryStores::in_memory())
        }
    };

    let services = AppServices::new(accounts, inventory, jwt_from_config(config));

    if let Some(admin) = &config.admin {
        let created = services
            .identity
            .ensure_admin(&admin.username, &admin.password)
            .await
            .context("admin bootstrap failed")?;
        if created {
            info!(username = %admin.username, "admin account bootstrapped");
        }
    }

    Ok(services)
}
