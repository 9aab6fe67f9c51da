use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_auth::{Role, UserAccount};
use stockdesk_core::{CategoryId, DomainResult};
use stockdesk_infra::identity::Session;
use stockdesk_infra::inventory::InventorySummary;
use stockdesk_inventory::{CategoryDraft, Money, ProductDraft, TradeDraft};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub active: bool,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for AccountResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id.get(),
            username: account.username,
            role: account.role,
            active: account.active,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub username: String,
    pub role: Role,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token.token,
            token_type: "Bearer",
            expires_in: session.token.expires_in,
            expires_at: session.token.expires_at,
            username: session.account.username,
            role: session.account.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

impl CategoryRequest {
    pub fn into_draft(self) -> DomainResult<CategoryDraft> {
        CategoryDraft::new(&self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub category_id: CategoryId,
    pub name: String,
    pub sku: String,
    pub price: Money,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub desc: Option<String>,
}

impl ProductRequest {
    pub fn into_draft(self) -> DomainResult<ProductDraft> {
        ProductDraft::new(
            self.category_id,
            &self.name,
            &self.sku,
            self.price,
            self.qty,
            self.desc.as_deref(),
        )
    }
}

/// Purchase or sale line. Any `total` sent by the client is ignored; the
/// server computes it from `price` and `qty`.
#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub item: String,
    pub qty: i64,
    pub price: Money,
}

impl TradeRequest {
    pub fn into_draft(self) -> DomainResult<TradeDraft> {
        TradeDraft::new(&self.item, self.qty, self.price)
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub categories: u64,
    pub products: u64,
    pub purchases: u64,
    pub sales: u64,
}

impl From<InventorySummary> for SummaryResponse {
    fn from(summary: InventorySummary) -> Self {
        Self {
            categories: summary.categories,
            products: summary.products,
            purchases: summary.purchases,
            sales: summary.sales,
        }
    }
}
