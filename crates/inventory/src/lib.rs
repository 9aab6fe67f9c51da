//! `stockdesk-inventory`: per-company inventory records.
//!
//! Categories, catalog products, purchases and sales. Every record belongs to
//! exactly one company account (its owner) and is only ever read or written
//! in that owner's scope. Validation lives in the draft constructors, so a
//! draft that exists is a draft a store may persist.

pub mod category;
pub mod money;
pub mod product;
pub mod record;
pub mod trade;

pub use category::{Category, CategoryDraft};
pub use money::Money;
pub use product::{Product, ProductDraft};
pub use record::OwnedRecord;
pub use trade::{Purchase, Sale, TradeDraft};
