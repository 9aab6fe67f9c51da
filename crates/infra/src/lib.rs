//! Infrastructure layer: stores, account and inventory services, configuration.

pub mod accounts;
pub mod companies;
pub mod config;
pub mod identity;
pub mod inventory;
pub mod store;
