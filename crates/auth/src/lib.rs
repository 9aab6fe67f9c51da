//! `stockdesk-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! mint and verify tokens, hash passwords, and decide whether a request may
//! pass, but not where accounts live or how requests arrive.

pub mod account;
pub mod claims;
pub mod password;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod token;

pub use account::{NewAccount, UserAccount};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{Argon2PasswordHasher, PasswordError, PasswordHasher};
pub use policy::{Access, AccessDenied, Decision, PathPattern, RoutePolicy, RouteRule};
pub use principal::Principal;
pub use roles::{Role, UnknownRole};
pub use token::{Hs256Jwt, IssuedToken, JwtIssuer, JwtValidator, TokenError};
