//! Owner-scoped record contract shared by every inventory store.

use chrono::{DateTime, Utc};

use stockdesk_core::{DomainError, DomainResult, Entity, UserId};

/// A record that belongs to one company account.
///
/// Stores assign the id on insert; `create` and `revise` are the only ways a
/// validated draft turns into record state.
pub trait OwnedRecord: Entity<Id: From<i64> + Into<i64>> + Clone + Send + Sync + 'static {
    type Draft: Clone + Send + Sync + 'static;

    /// Singular name used in errors and logs.
    const KIND: &'static str;

    fn owner(&self) -> UserId;

    fn create(id: Self::Id, owner: UserId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn revise(&mut self, draft: Self::Draft, now: DateTime<Utc>);

    /// Key that must be unique among one owner's records, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// Trim `raw` and check its length in characters.
pub(crate) fn required_text(field: &str, raw: &str, max: usize) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}
