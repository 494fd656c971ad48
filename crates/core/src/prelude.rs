//! Prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{AddOutcome, Cart, CartError, CartLineItem, CartLineUuid, UserUuid},
    catalog::{Catalog, CatalogError, ProductCatalog},
    discounts::{Discount, DiscountError},
    fixtures::{FixtureError, catalog_from_path, catalog_from_str},
    pricing::{
        CartTotals, PricedLine, PricingError, compute_totals, effective_unit_price, line_total,
    },
    products::{Product, ProductError, ProductUuid},
    quantity::{Quantity, QuantityError},
    reconciler::{MutationId, MutationKind, PendingMutation, Reconciliation, Reconciler},
};
