use chrono::{DateTime, Utc};
use serde::Serialize;

use stockdesk_core::{CategoryId, DomainError, DomainResult, Entity, ProductId, UserId};

use crate::money::Money;
use crate::record::{OwnedRecord, required_text};

pub const PRODUCT_NAME_MAX: usize = 200;
pub const SKU_MAX: usize = 64;
pub const DESCRIPTION_MAX: usize = 1000;

/// A catalog product with its on-hand quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(skip_serializing)]
    pub owner: UserId,
    pub category_id: CategoryId,
    pub name: String,
    pub sku: String,
    pub price: Money,
    pub qty: i64,
    pub desc: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated product input.
///
/// SKUs are unique per company, ignoring case. The category reference is
/// checked by the inventory service, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub category_id: CategoryId,
    pub name: String,
    pub sku: String,
    pub price: Money,
    pub qty: i64,
    pub desc: String,
}

impl ProductDraft {
    pub fn new(
        category_id: CategoryId,
        name: &str,
        sku: &str,
        price: Money,
        qty: i64,
        desc: Option<&str>,
    ) -> DomainResult<Self> {
        let name = required_text("product name", name, PRODUCT_NAME_MAX)?;
        let sku = required_text("sku", sku, SKU_MAX)?;
        if sku.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("sku must not contain whitespace"));
        }
        if qty < 0 {
            return Err(DomainError::validation("qty must not be negative"));
        }
        let desc = desc.unwrap_or_default().trim().to_string();
        if desc.chars().count() > DESCRIPTION_MAX {
            return Err(DomainError::validation(format!(
                "desc must be at most {DESCRIPTION_MAX} characters"
            )));
        }

        Ok(Self {
            category_id,
            name,
            sku,
            price,
            qty,
            desc,
        })
    }
}

impl Product {
    /// Value of the stock on hand, if it fits.
    pub fn stock_value(&self) -> Option<Money> {
        self.price.checked_mul(self.qty)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl OwnedRecord for Product {
    type Draft = ProductDraft;

    const KIND: &'static str = "product";

    fn owner(&self) -> UserId {
        self.owner
    }

    fn create(id: ProductId, owner: UserId, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            category_id: draft.category_id,
            name: draft.name,
            sku: draft.sku,
            price: draft.price,
            qty: draft.qty,
            desc: draft.desc,
            created_at: now,
            updated_at: now,
        }
    }

    fn revise(&mut self, draft: ProductDraft, now: DateTime<Utc>) {
        self.category_id = draft.category_id;
        self.name = draft.name;
        self.sku = draft.sku;
        self.price = draft.price;
        self.qty = draft.qty;
        self.desc = draft.desc;
        self.updated_at = now;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.sku.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(major: f64) -> Money {
        Money::from_major(major).unwrap()
    }

    #[test]
    fn draft_normalizes_text_fields() {
        let draft = ProductDraft::new(CategoryId::new(1), " Hammer ", " HM-01 ", price(9.5), 3, Some("  steel ")).unwrap();
        assert_eq!(draft.name, "Hammer");
        assert_eq!(draft.sku, "HM-01");
        assert_eq!(draft.desc, "steel");

        let draft = ProductDraft::new(CategoryId::new(1), "Hammer", "HM-01", price(9.5), 0, None).unwrap();
        assert_eq!(draft.desc, "");
    }

    #[test]
    fn draft_rejects_invalid_input() {
        let cat = CategoryId::new(1);
        assert!(ProductDraft::new(cat, "", "HM-01", price(1.0), 1, None).is_err());
        assert!(ProductDraft::new(cat, "Hammer", " ", price(1.0), 1, None).is_err());
        assert!(ProductDraft::new(cat, "Hammer", "HM 01", price(1.0), 1, None).is_err());
        assert!(ProductDraft::new(cat, "Hammer", "HM-01", price(1.0), -1, None).is_err());
        let long = "d".repeat(DESCRIPTION_MAX + 1);
        assert!(ProductDraft::new(cat, "Hammer", "HM-01", price(1.0), 1, Some(&long)).is_err());
    }

    #[test]
    fn serializes_with_frontend_field_names() {
        let draft = ProductDraft::new(CategoryId::new(4), "Hammer", "HM-01", price(9.5), 3, None).unwrap();
        let product = Product::create(ProductId::new(2), UserId::new(7), draft, Utc::now());
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["categoryId"], 4);
        assert_eq!(json["price"], 9.5);
        assert_eq!(json["qty"], 3);
        assert!(json.get("owner").is_none());
        assert_eq!(product.stock_value(), Some(price(28.5)));
    }

    #[test]
    fn sku_uniqueness_ignores_case() {
        let now = Utc::now();
        let make = |sku: &str| {
            let draft = ProductDraft::new(CategoryId::new(1), "Hammer", sku, price(1.0), 1, None).unwrap();
            Product::create(ProductId::new(1), UserId::new(1), draft, now)
        };
        assert_eq!(make("hm-01").unique_key(), make("HM-01").unique_key());
    }
}
