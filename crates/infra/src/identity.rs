//! Registration, login and admin bootstrap.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use stockdesk_auth::{
    IssuedToken, JwtIssuer, NewAccount, PasswordError, PasswordHasher, Role, TokenError,
    UserAccount,
};
use stockdesk_core::DomainError;

use crate::accounts::{AccountRepository, StoreError};

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0}")]
    Validation(String),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("account is disabled")]
    AccountDisabled,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for IdentityError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UsernameTaken(username) => IdentityError::UsernameTaken(username),
            other => IdentityError::Store(other),
        }
    }
}

impl From<DomainError> for IdentityError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => IdentityError::Validation(msg),
            other => IdentityError::Validation(other.to_string()),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: UserAccount,
    pub token: IssuedToken,
}

pub struct IdentityService<R> {
    accounts: R,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn JwtIssuer>,
}

impl<R> IdentityService<R>
where
    R: AccountRepository,
{
    pub fn new(accounts: R, hasher: Arc<dyn PasswordHasher>, issuer: Arc<dyn JwtIssuer>) -> Self {
        Self {
            accounts,
            hasher,
            issuer,
        }
    }

    /// Self-service registration: creates an active COMPANY account.
    pub async fn register_company(&self, username: &str, password: &str) -> Result<UserAccount, IdentityError> {
        self.create_account(username, password, Role::Company).await
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, IdentityError> {
        let Some(account) = self.accounts.find_by_username(username.trim()).await? else {
            // Hash anyway; timing must not reveal unknown usernames.
            let _ = self.hasher.hash(password);
            warn!("login rejected: unknown username");
            return Err(IdentityError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &account.password_hash)? {
            warn!(username = %account.username, "login rejected: bad password");
            return Err(IdentityError::InvalidCredentials);
        }
        if !account.active {
            warn!(username = %account.username, "login rejected: account disabled");
            return Err(IdentityError::AccountDisabled);
        }

        let token = self.issuer.issue(&account.username, account.role, now)?;
        info!(username = %account.username, role = %account.role, "login succeeded");
        Ok(Session { account, token })
    }

    /// Create the admin account unless it already exists.
    ///
    /// Returns `true` when an account was created. Fails when the username is
    /// held by a non-admin account.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, IdentityError> {
        if let Some(existing) = self.accounts.find_by_username(username.trim()).await? {
            if existing.role != Role::Admin {
                return Err(IdentityError::Validation(
                    "bootstrap username belongs to a non-admin account".to_string(),
                ));
            }
            info!(username = %existing.username, "admin bootstrap skipped: account exists");
            return Ok(false);
        }
        self.create_account(username, password, Role::Admin).await?;
        Ok(true)
    }

    async fn create_account(&self, username: &str, password: &str, role: Role) -> Result<UserAccount, IdentityError> {
        validate_password(password)?;
        let draft = NewAccount::new(username, String::new(), role)?;

        if self.accounts.exists_by_username(&draft.username).await? {
            return Err(IdentityError::UsernameTaken(draft.username));
        }

        let password_hash = self.hasher.hash(password)?;
        let account = self
            .accounts
            .insert(NewAccount {
                password_hash,
                ..draft
            })
            .await?;

        info!(id = %account.id, username = %account.username, role = %account.role, "account created");
        Ok(account)
    }
}

fn validate_password(password: &str) -> Result<(), IdentityError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN || len > PASSWORD_MAX {
        return Err(IdentityError::Validation(format!(
            "password must be {PASSWORD_MIN}-{PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;

    use stockdesk_auth::{Argon2PasswordHasher, Hs256Jwt, JwtValidator};

    use super::*;
    use crate::accounts::InMemoryAccountRepository;

    fn service() -> (IdentityService<Arc<InMemoryAccountRepository>>, Arc<Hs256Jwt>, Arc<InMemoryAccountRepository>) {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let jwt = Arc::new(Hs256Jwt::new(b"identity-test-secret", Duration::minutes(15)));
        let service = IdentityService::new(repo.clone(), Arc::new(Argon2PasswordHasher), jwt.clone());
        (service, jwt, repo)
    }

    #[tokio::test]
    async fn register_creates_active_company_with_hashed_password() {
        let (service, _, _) = service();
        let account = service.register_company(" acme ", "correct-horse").await.unwrap();

        assert_eq!(account.username, "acme");
        assert_eq!(account.role, Role::Company);
        assert!(account.active);
        assert_ne!(account.password_hash, "correct-horse");
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_bad_input() {
        let (service, _, _) = service();
        service.register_company("acme", "correct-horse").await.unwrap();

        assert!(matches!(
            service.register_company("acme", "another-pass").await,
            Err(IdentityError::UsernameTaken(u)) if u == "acme"
        ));
        assert!(matches!(
            service.register_company("globex", "short").await,
            Err(IdentityError::Validation(_))
        ));
        assert!(matches!(
            service.register_company("x", "long-enough-pass").await,
            Err(IdentityError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let (service, jwt, _) = service();
        service.register_company("acme", "correct-horse").await.unwrap();

        let now = Utc::now();
        let session = service.login("acme", "correct-horse", now).await.unwrap();
        let claims = jwt.validate(&session.token.token, now).unwrap();

        assert_eq!(claims.sub, "acme");
        assert_eq!(claims.role, Role::Company);
        assert_eq!(session.token.expires_in, 15 * 60);
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let (service, _, _) = service();
        service.register_company("acme", "correct-horse").await.unwrap();

        assert!(matches!(
            service.login("acme", "wrong-horse", Utc::now()).await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("nobody", "correct-horse", Utc::now()).await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn login_rejects_disabled_accounts() {
        let (service, _, repo) = service();
        let mut account = service.register_company("acme", "correct-horse").await.unwrap();
        account.active = false;
        repo.save(&account).await.unwrap();

        assert!(matches!(
            service.login("acme", "correct-horse", Utc::now()).await,
            Err(IdentityError::AccountDisabled)
        ));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let (service, _, repo) = service();
        assert!(service.ensure_admin("root", "admin-password").await.unwrap());
        assert!(!service.ensure_admin("root", "admin-password").await.unwrap());

        let admins = repo.find_by_role(Role::Admin).await.unwrap();
        assert_eq!(admins.len(), 1);
    }

    #[tokio::test]
    async fn ensure_admin_refuses_a_name_held_by_a_company() {
        let (service, _, repo) = service();
        service.register_company("root", "company-password").await.unwrap();

        assert!(matches!(
            service.ensure_admin("root", "admin-password").await,
            Err(IdentityError::Validation(_))
        ));
        assert!(repo.find_by_role(Role::Admin).await.unwrap().is_empty());
    }

    /// Counts hash calls; verifies by plain comparison.
    #[derive(Default)]
    struct CountingHasher {
        hashes: AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, PasswordError> {
            self.hashes.fetch_add(1, Ordering::SeqCst);
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
            Ok(hash == format!("plain:{password}"))
        }
    }

    #[tokio::test]
    async fn login_for_unknown_user_still_does_hashing_work() {
        let hasher = Arc::new(CountingHasher::default());
        let jwt = Arc::new(Hs256Jwt::new(b"identity-test-secret", Duration::minutes(15)));
        let service = IdentityService::new(Arc::new(InMemoryAccountRepository::new()), hasher.clone(), jwt);

        assert!(matches!(
            service.login("nobody", "whatever-pass", Utc::now()).await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert_eq!(hasher.hashes.load(Ordering::SeqCst), 1);
    }
}
