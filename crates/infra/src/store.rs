use thiserror::Error;

use stockdesk_core::UserId;

/// Failure inside a persistence backend (accounts or inventory records).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("{kind} '{key}' already exists")]
    Duplicate { kind: &'static str, key: String },

    #[error("account {0} does not exist")]
    Missing(UserId),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

pub(crate) fn map_sqlx_error(operation: &'static str, source: sqlx::Error) -> StoreError {
    StoreError::Database { operation, source }
}
