//! User account entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

/// A persisted user account.
///
/// # Invariants
/// - `id` and `username` never change after creation.
/// - `username` is unique across the store (enforced by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn is_company(&self) -> bool {
        self.role == Role::Company
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

impl NewAccount {
    pub const USERNAME_MIN: usize = 3;
    pub const USERNAME_MAX: usize = 64;

    /// Build an active account after validating the username.
    pub fn new(
        username: &str,
        password_hash: impl Into<String>,
        role: Role,
    ) -> DomainResult<Self> {
        let username = normalize_username(username)?;
        Ok(Self {
            username,
            password_hash: password_hash.into(),
            role,
            active: true,
        })
    }
}

/// Trim and validate a username: 3..=64 chars of `[A-Za-z0-9_.-]`.
pub fn normalize_username(raw: &str) -> DomainResult<String> {
    let username = raw.trim();
    let len = username.chars().count();
    if len < NewAccount::USERNAME_MIN || len > NewAccount::USERNAME_MAX {
        return Err(DomainError::validation(format!(
            "username must be {}-{} characters",
            NewAccount::USERNAME_MIN,
            NewAccount::USERNAME_MAX
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(DomainError::validation(
            "username may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(username.to_string())
}
