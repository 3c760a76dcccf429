//! freshcart
//!
//! freshcart is the core of a grocery storefront: a product catalog, a shopping
//! cart with delivery pricing, mock sign-in and order checkout, with state kept
//! in a small key-value store.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
pub mod storage;
