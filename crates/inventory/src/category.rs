use chrono::{DateTime, Utc};
use serde::Serialize;

use stockdesk_core::{CategoryId, DomainResult, Entity, UserId};

use crate::record::{OwnedRecord, required_text};

pub const CATEGORY_NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    #[serde(skip_serializing)]
    pub owner: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated category input. Names are unique per company, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
}

impl CategoryDraft {
    pub fn new(name: &str) -> DomainResult<Self> {
        Ok(Self {
            name: required_text("category name", name, CATEGORY_NAME_MAX)?,
        })
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl OwnedRecord for Category {
    type Draft = CategoryDraft;

    const KIND: &'static str = "category";

    fn owner(&self) -> UserId {
        self.owner
    }

    fn create(id: CategoryId, owner: UserId, draft: CategoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            name: draft.name,
            created_at: now,
            updated_at: now,
        }
    }

    fn revise(&mut self, draft: CategoryDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.updated_at = now;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }
}
