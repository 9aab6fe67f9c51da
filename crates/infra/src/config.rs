//! Configuration loading and representation.
//!
//! Built once at startup from the environment and passed down explicitly.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Admin account created at startup when both credentials are configured.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub cors_allowed_origin: String,
    /// `None` selects the in-memory account store.
    pub database_url: Option<String>,
    pub admin: Option<AdminBootstrap>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_minutes", &self.jwt_ttl.num_minutes())
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("database", &self.database_url.as_ref().map(|_| "<configured>"))
            .field("admin", &self.admin)
            .finish()
    }
}

impl AppConfig {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:5050";
    pub const DEFAULT_CORS_ORIGIN: &'static str = "http://localhost:5173";
    pub const DEFAULT_JWT_TTL_MINUTES: i64 = 60;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let ttl_minutes = match var("JWT_TTL_MINUTES") {
            Some(raw) => raw.parse::<i64>().map_err(|e| ConfigError::Invalid {
                var: "JWT_TTL_MINUTES",
                reason: e.to_string(),
            })?,
            None => Self::DEFAULT_JWT_TTL_MINUTES,
        };
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_TTL_MINUTES",
                reason: "must be greater than 0".to_string(),
            });
        }

        let cors_allowed_origin =
            var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| Self::DEFAULT_CORS_ORIGIN.to_string());
        if !cors_allowed_origin.starts_with("http://") && !cors_allowed_origin.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "CORS_ALLOWED_ORIGIN",
                reason: "must be an http(s) origin".to_string(),
            });
        }

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap { username, password }),
            (None, None) => None,
            _ => {
                warn!("ADMIN_USERNAME and ADMIN_PASSWORD must both be set; skipping admin bootstrap");
                None
            }
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_ttl: Duration::minutes(ttl_minutes),
            cors_allowed_origin,
            database_url: var("DATABASE_URL"),
            admin,
        })
    }

    /// Deterministic settings for tests: ephemeral port, in-memory store.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.to_string(),
            jwt_ttl: Duration::minutes(Self::DEFAULT_JWT_TTL_MINUTES),
            cors_allowed_origin: Self::DEFAULT_CORS_ORIGIN.to_string(),
            database_url: None,
            admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 5050);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.jwt_ttl, Duration::minutes(60));
        assert_eq!(config.cors_allowed_origin, "http://localhost:5173");
        assert!(config.database_url.is_none());
        assert!(config.admin.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = load(&[
            ("BIND_ADDR", "127.0.0.1:8081"),
            ("JWT_SECRET", "prod-secret"),
            ("JWT_TTL_MINUTES", "15"),
            ("CORS_ALLOWED_ORIGIN", "https://app.example.com"),
            ("DATABASE_URL", "postgres://localhost/stockdesk"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "admin-password"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8081);
        assert_eq!(config.jwt_ttl, Duration::minutes(15));
        assert_eq!(config.admin.as_ref().unwrap().username, "root");
        assert!(config.database_url.is_some());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            load(&[("JWT_TTL_MINUTES", "0")]),
            Err(ConfigError::Invalid { var: "JWT_TTL_MINUTES", .. })
        ));
        assert!(matches!(
            load(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { var: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            load(&[("CORS_ALLOWED_ORIGIN", "localhost:5173")]),
            Err(ConfigError::Invalid { var: "CORS_ALLOWED_ORIGIN", .. })
        ));
    }

    #[test]
    fn half_configured_admin_is_ignored() {
        let config = load(&[("ADMIN_USERNAME", "root")]).unwrap();
        assert!(config.admin.is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[("JWT_SECRET", "prod-secret"), ("ADMIN_USERNAME", "root"), ("ADMIN_PASSWORD", "pw-123456")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("prod-secret"));
        assert!(!rendered.contains("pw-123456"));
    }
}
