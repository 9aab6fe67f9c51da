//! Route-to-role policy table for the request gate.
//!
//! The table is an ordered list of rules evaluated first-match, with a
//! fallback for paths no rule covers. It is pure data: the HTTP layer asks
//! which [`Access`] level applies, authenticates only when needed, then asks
//! for a [`Decision`].

use std::borrow::Cow;

use thiserror::Error;

use crate::{Principal, Role};

/// What a request needs in order to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No token required; an invalid token is ignored.
    Public,
    /// Any verified identity.
    Authenticated,
    /// A verified identity holding exactly this role.
    Role(Role),
}

impl Access {
    pub fn requires_identity(&self) -> bool {
        !matches!(self, Access::Public)
    }

    pub fn check(&self, principal: Option<&Principal>) -> Decision {
        match (self, principal) {
            (Access::Public, _) => Decision::Allow,
            (_, None) => Decision::Deny(AccessDenied::Unauthenticated),
            (Access::Authenticated, Some(_)) => Decision::Allow,
            (Access::Role(required), Some(p)) if p.has_role(*required) => Decision::Allow,
            (Access::Role(required), Some(_)) => {
                Decision::Deny(AccessDenied::Forbidden { required: *required })
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    /// No (valid) identity on a protected path.
    #[error("authentication required")]
    Unauthenticated,

    /// Valid identity, insufficient role.
    #[error("forbidden: requires role {required}")]
    Forbidden { required: Role },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(AccessDenied),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Path matcher using the `/**` convention for "this prefix and below".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Any,
    Exact(Cow<'static, str>),
    /// Matches the prefix itself and anything below it on a `/` boundary.
    Prefix(Cow<'static, str>),
}

impl PathPattern {
    pub fn parse(pattern: impl Into<Cow<'static, str>>) -> Self {
        let pattern = pattern.into();
        if pattern == "/**" {
            return PathPattern::Any;
        }
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(Cow::Owned(prefix.to_string())),
            None => PathPattern::Exact(pattern),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Any => true,
            PathPattern::Exact(p) => path == &**p || path.strip_suffix('/') == Some(&**p),
            PathPattern::Prefix(prefix) => match path.strip_prefix(&**prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// HTTP method restriction; `None` matches every method.
    pub method: Option<Cow<'static, str>>,
    pub pattern: PathPattern,
    pub access: Access,
}

impl RouteRule {
    pub fn new(pattern: impl Into<Cow<'static, str>>, access: Access) -> Self {
        Self {
            method: None,
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    pub fn with_method(mut self, method: impl Into<Cow<'static, str>>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn matches(&self, method: &str, path: &str) -> bool {
        let method_ok = self
            .method
            .as_deref()
            .is_none_or(|m| m.eq_ignore_ascii_case(method));
        method_ok && self.pattern.matches(path)
    }
}

/// Ordered, first-match policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
    fallback: Access,
}

impl RoutePolicy {
    pub fn new(rules: Vec<RouteRule>, fallback: Access) -> Self {
        Self { rules, fallback }
    }

    /// The backend's policy table.
    ///
    /// 1. CORS preflight: public.
    /// 2. Auth endpoints, company registration, health: public.
    /// 3. `/api/admin/**`: ADMIN only.
    /// 4. Inventory resources: COMPANY only.
    /// 5. Everything else under `/api/**`: any authenticated caller.
    /// 6. Non-API paths (SPA routes): public.
    pub fn standard() -> Self {
        Self::new(
            vec![
                RouteRule::new("/**", Access::Public).with_method("OPTIONS"),
                RouteRule::new("/api/auth/**", Access::Public),
                RouteRule::new("/api/companies/register", Access::Public),
                RouteRule::new("/actuator/health", Access::Public),
                RouteRule::new("/api/admin/**", Access::Role(Role::Admin)),
                RouteRule::new("/api/categories/**", Access::Role(Role::Company)),
                RouteRule::new("/api/products/**", Access::Role(Role::Company)),
                RouteRule::new("/api/purchases/**", Access::Role(Role::Company)),
                RouteRule::new("/api/sales/**", Access::Role(Role::Company)),
                RouteRule::new("/api/companies/me/summary", Access::Role(Role::Company)),
                RouteRule::new("/api/**", Access::Authenticated),
            ],
            Access::Public,
        )
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Access level for a request: the first matching rule, else the fallback.
    pub fn requirement(&self, method: &str, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.access)
            .unwrap_or(self.fallback)
    }

    pub fn evaluate(&self, method: &str, path: &str, principal: Option<&Principal>) -> Decision {
        self.requirement(method, path).check(principal)
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn admin() -> Principal {
        Principal::new("root", Role::Admin)
    }

    fn company() -> Principal {
        Principal::new("acme", Role::Company)
    }

    #[test]
    fn preflight_is_always_allowed() {
        let policy = RoutePolicy::standard();
        assert!(policy.evaluate("OPTIONS", "/api/admin/companies", None).is_allowed());
        assert!(policy.evaluate("options", "/api/companies/me", None).is_allowed());
    }

    #[test]
    fn public_endpoints_need_no_identity() {
        let policy = RoutePolicy::standard();
        for path in [
            "/api/auth/login",
            "/api/auth/register",
            "/api/auth",
            "/api/companies/register",
            "/api/companies/register/",
            "/actuator/health",
        ] {
            assert_eq!(policy.requirement("POST", path), Access::Public, "{path}");
            assert!(policy.evaluate("POST", path, None).is_allowed(), "{path}");
        }
    }

    #[test]
    fn admin_paths_need_admin_role() {
        let policy = RoutePolicy::standard();
        let path = "/api/admin/companies";

        assert_eq!(
            policy.evaluate("GET", path, None),
            Decision::Deny(AccessDenied::Unauthenticated)
        );
        assert_eq!(
            policy.evaluate("GET", path, Some(&company())),
            Decision::Deny(AccessDenied::Forbidden { required: Role::Admin })
        );
        assert!(policy.evaluate("GET", path, Some(&admin())).is_allowed());
    }

    #[test]
    fn inventory_paths_need_company_role() {
        let policy = RoutePolicy::standard();
        for path in ["/api/categories", "/api/products/7", "/api/purchases", "/api/sales/1", "/api/companies/me/summary"] {
            assert_eq!(
                policy.evaluate("GET", path, None),
                Decision::Deny(AccessDenied::Unauthenticated),
                "{path}"
            );
            assert_eq!(
                policy.evaluate("DELETE", path, Some(&admin())),
                Decision::Deny(AccessDenied::Forbidden { required: Role::Company }),
                "{path}"
            );
            assert!(policy.evaluate("PUT", path, Some(&company())).is_allowed(), "{path}");
        }
    }

    #[test]
    fn other_api_paths_need_any_identity() {
        let policy = RoutePolicy::standard();
        assert_eq!(
            policy.evaluate("GET", "/api/companies/me", None),
            Decision::Deny(AccessDenied::Unauthenticated)
        );
        assert!(policy.evaluate("GET", "/api/companies/me", Some(&company())).is_allowed());
        assert!(policy.evaluate("GET", "/api/companies/me", Some(&admin())).is_allowed());
        // Not the registration endpoint, so not public.
        assert_eq!(policy.requirement("POST", "/api/companies/register/extra"), Access::Authenticated);
    }

    #[test]
    fn non_api_paths_fall_through_to_public() {
        let policy = RoutePolicy::standard();
        for path in ["/", "/login", "/dashboard/products", "/apix", "/assets/app.js"] {
            assert_eq!(policy.requirement("GET", path), Access::Public, "{path}");
        }
    }

    #[test]
    fn prefix_matches_on_segment_boundary_only() {
        let pattern = PathPattern::parse("/api/admin/**");
        assert!(pattern.matches("/api/admin"));
        assert!(pattern.matches("/api/admin/"));
        assert!(pattern.matches("/api/admin/companies/3/status"));
        assert!(!pattern.matches("/api/administer"));
        assert!(!pattern.matches("/api"));
    }

    #[test]
    fn first_match_wins() {
        let policy = RoutePolicy::new(
            vec![
                RouteRule::new("/api/**", Access::Authenticated),
                RouteRule::new("/api/admin/**", Access::Role(Role::Admin)),
                RouteRule::new("/api/categories/**", Access::Role(Role::Company)),
                RouteRule::new("/api/products/**", Access::Role(Role::Company)),
                RouteRule::new("/api/purchases/**", Access::Role(Role::Company)),
                RouteRule::new("/api/sales/**", Access::Role(Role::Company)),
                RouteRule::new("/api/companies/me/summary", Access::Role(Role::Company)),
            ],
            Access::Public,
        );
        assert_eq!(policy.requirement("GET", "/api/admin/x"), Access::Authenticated);
    }

    fn non_admin_principal() -> impl Strategy<Value = Option<Principal>> {
        prop_oneof![
            Just(None),
            "[a-z]{3,12}".prop_map(|u| Some(Principal::new(u, Role::Company))),
            "[a-z]{3,12}".prop_map(|u| Some(Principal::new(u, Role::User))),
        ]
    }

    fn any_principal() -> impl Strategy<Value = Option<Principal>> {
        prop_oneof![
            non_admin_principal(),
            "[a-z]{3,12}".prop_map(|u| Some(Principal::new(u, Role::Admin))),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no non-OPTIONS request to an admin path passes without ADMIN.
        #[test]
        fn admin_paths_reject_non_admins(
            method in prop::sample::select(vec!["GET", "POST", "PUT", "PATCH", "DELETE"]),
            tail in "(/[a-z0-9]{1,8}){0,3}",
            principal in non_admin_principal(),
        ) {
            let policy = RoutePolicy::standard();
            let path = format!("/api/admin{tail}");
            let decision = policy.evaluate(method, &path, principal.as_ref());
            prop_assert!(!decision.is_allowed());
            if principal.is_none() {
                prop_assert_eq!(decision, Decision::Deny(AccessDenied::Unauthenticated));
            }
        }

        /// Property: public paths pass for anyone, including anonymous callers.
        #[test]
        fn public_paths_allow_everyone(
            method in prop::sample::select(vec!["GET", "POST", "PUT", "DELETE"]),
            tail in "(/[a-z0-9]{1,8}){0,3}",
            principal in any_principal(),
        ) {
            let policy = RoutePolicy::standard();
            let path = format!("/api/auth{tail}");
            prop_assert!(policy.evaluate(method, &path, principal.as_ref()).is_allowed());
            prop_assert!(policy
                .evaluate(method, "/api/companies/register", principal.as_ref())
                .is_allowed());
        }
    }
}
