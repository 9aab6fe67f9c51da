use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role attached to an account, used for coarse-grained authorization.
///
/// Closed set: role checks compare enum variants, never strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Company,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Company, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Company => "COMPANY",
            Role::User => "USER",
        }
    }

    /// Authority spelling (`ROLE_*`) as stored by older deployments.
    pub fn authority(&self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Company => "ROLE_COMPANY",
            Role::User => "ROLE_USER",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match name {
            "ADMIN" => Ok(Role::Admin),
            "COMPANY" => Ok(Role::Company),
            "USER" => Ok(Role::User),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
