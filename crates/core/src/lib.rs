//! Carts and pricing
//!
//! Cart consistency and pricing for the `eatease` storefront: validated
//! products, discount-aware price aggregation, the server-side cart store and
//! the client-side optimistic reconciler.

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod quantity;
pub mod reconciler;
pub mod uuids;
