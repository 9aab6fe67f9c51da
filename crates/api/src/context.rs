use stockdesk_auth::{Principal, Role};

/// Principal context for a request (authenticated identity + role).
///
/// Inserted into request extensions by the request gate; present on every
/// route the policy marks as authenticated or role-restricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    username: String,
    role: Role,
}

impl PrincipalContext {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<Principal> for PrincipalContext {
    fn from(principal: Principal) -> Self {
        Self::new(principal.username, principal.role)
    }
}
