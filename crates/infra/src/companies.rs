//! Company account service: admin listing/status toggling and self-service
//! profile lookup for accounts holding the COMPANY role.

use thiserror::Error;
use tracing::info;

use stockdesk_auth::{Role, UserAccount};
use stockdesk_core::UserId;

use crate::accounts::{AccountRepository, StoreError};

#[derive(Debug, Error)]
pub enum CompanyError {
    #[error("company not found")]
    NotFound,

    /// The account exists but does not hold the COMPANY role.
    #[error("user is not a company")]
    InvalidRole,

    #[error("company account is disabled")]
    Disabled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CompanyService<R> {
    accounts: R,
}

impl<R> CompanyService<R>
where
    R: AccountRepository,
{
    pub fn new(accounts: R) -> Self {
        Self { accounts }
    }

    /// All COMPANY accounts, ordered by id.
    pub async fn list_companies(&self) -> Result<Vec<UserAccount>, CompanyError> {
        Ok(self.accounts.find_by_role(Role::Company).await?)
    }

    pub async fn set_active(&self, id: UserId, active: bool) -> Result<UserAccount, CompanyError> {
        let mut company = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(CompanyError::NotFound)?;
        ensure_company(&company)?;

        company.set_active(active);
        let saved = self.accounts.save(&company).await?;
        info!(company_id = %saved.id, username = %saved.username, active, "company status updated");
        Ok(saved)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<UserAccount, CompanyError> {
        let company = self
            .accounts
            .find_by_username(username)
            .await?
            .ok_or(CompanyError::NotFound)?;
        ensure_company(&company)?;
        Ok(company)
    }

    /// Resolve the company that owns inventory rows for `username`.
    ///
    /// `Disabled` for an inactive company, even while its token is valid.
    pub async fn active_company(&self, username: &str) -> Result<UserId, CompanyError> {
        let company = self.get_by_username(username).await?;
        if !company.active {
            return Err(CompanyError::Disabled);
        }
        Ok(company.id)
    }
}

fn ensure_company(account: &UserAccount) -> Result<(), CompanyError> {
    if account.is_company() {
        Ok(())
    } else {
        Err(CompanyError::InvalidRole)
    }
}
