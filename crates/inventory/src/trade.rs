//! Purchases and sales: free-text line entries with a computed total.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockdesk_core::{DomainError, DomainResult, Entity, PurchaseId, SaleId, UserId};

use crate::money::Money;
use crate::record::{OwnedRecord, required_text};

pub const ITEM_MAX: usize = 200;

/// Validated purchase/sale line. `total` is always `price * qty`; a total
/// sent by a client is never trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeDraft {
    pub item: String,
    pub qty: i64,
    pub price: Money,
    pub total: Money,
}

impl TradeDraft {
    pub fn new(item: &str, qty: i64, price: Money) -> DomainResult<Self> {
        let item = required_text("item", item, ITEM_MAX)?;
        if qty < 1 {
            return Err(DomainError::validation("qty must be at least 1"));
        }
        let total = price
            .checked_mul(qty)
            .ok_or_else(|| DomainError::validation("total is too large"))?;
        Ok(Self {
            item,
            qty,
            price,
            total,
        })
    }
}

macro_rules! trade_record {
    ($(#[$meta:meta])* $name:ident, $id:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub id: $id,
            #[serde(skip_serializing)]
            pub owner: UserId,
            pub item: String,
            pub qty: i64,
            pub price: Money,
            pub total: Money,
            pub created_at: DateTime<Utc>,
            pub updated_at: DateTime<Utc>,
        }

        impl Entity for $name {
            type Id = $id;

            fn id(&self) -> $id {
                self.id
            }
        }

        impl OwnedRecord for $name {
            type Draft = TradeDraft;

            const KIND: &'static str = $kind;

            fn owner(&self) -> UserId {
                self.owner
            }

            fn create(id: $id, owner: UserId, draft: TradeDraft, now: DateTime<Utc>) -> Self {
                Self {
                    id,
                    owner,
                    item: draft.item,
                    qty: draft.qty,
                    price: draft.price,
                    total: draft.total,
                    created_at: now,
                    updated_at: now,
                }
            }

            fn revise(&mut self, draft: TradeDraft, now: DateTime<Utc>) {
                self.item = draft.item;
                self.qty = draft.qty;
                self.price = draft.price;
                self.total = draft.total;
                self.updated_at = now;
            }
        }
    };
}

trade_record!(
    /// Goods bought in by a company.
    Purchase,
    PurchaseId,
    "purchase"
);

trade_record!(
    /// Goods sold by a company.
    Sale,
    SaleId,
    "sale"
);

#[cfg(test)]
mod tests {
    use super::*;

    fn money(major: f64) -> Money {
        Money::from_major(major).unwrap()
    }

    #[test]
    fn total_is_computed_from_price_and_qty() {
        let draft = TradeDraft::new(" Bolts ", 4, money(2.25)).unwrap();
        assert_eq!(draft.item, "Bolts");
        assert_eq!(draft.total, money(9.0));
    }

    #[test]
    fn rejects_empty_items_and_non_positive_qty() {
        assert!(TradeDraft::new("", 1, money(1.0)).is_err());
        assert!(TradeDraft::new("Bolts", 0, money(1.0)).is_err());
        assert!(TradeDraft::new("Bolts", -2, money(1.0)).is_err());
    }

    #[test]
    fn rejects_totals_that_overflow() {
        let price = Money::from_minor(i64::MAX / 2).unwrap();
        assert!(TradeDraft::new("Bolts", 3, price).is_err());
    }

    #[test]
    fn purchases_and_sales_share_the_line_shape() {
        let now = Utc::now();
        let draft = TradeDraft::new("Bolts", 2, money(1.5)).unwrap();
        let purchase = Purchase::create(PurchaseId::new(1), UserId::new(5), draft.clone(), now);
        let sale = Sale::create(SaleId::new(1), UserId::new(5), draft, now);

        assert_eq!(Purchase::KIND, "purchase");
        assert_eq!(Sale::KIND, "sale");
        assert_eq!(purchase.total, sale.total);
        assert_eq!(purchase.unique_key(), None);

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["item"], "Bolts");
        assert_eq!(json["total"], 3.0);
        assert!(json.get("owner").is_none());
    }
}
