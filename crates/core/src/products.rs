//! Products

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::Discount,
    pricing::{PricingError, effective_unit_price},
    uuids::TypedUuid,
};

/// Product UUID
pub type ProductUuid = TypedUuid<Product<'static>>;

/// Errors raised while validating a product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// Base prices cannot be negative.
    #[error("product price must not be negative, got {0} minor units")]
    NegativePrice(i64),
}

/// A sellable product, as seen by the cart.
///
/// Values are validated on construction, so a `Product` always has a
/// non-negative price and a discount between 0 and 100 percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    uuid: ProductUuid,
    name: String,
    price: Money<'a, Currency>,
    discount: Discount,
    stock: u32,
}

impl<'a> Product<'a> {
    /// Creates a validated product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NegativePrice`] if `price` is below zero.
    pub fn new(
        uuid: ProductUuid,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        discount: Discount,
        stock: u32,
    ) -> Result<Self, ProductError> {
        let minor = price.to_minor_units();

        if minor < 0 {
            return Err(ProductError::NegativePrice(minor));
        }

        Ok(Self {
            uuid,
            name: name.into(),
            price,
            discount,
            stock,
        })
    }

    /// Product UUID
    pub fn uuid(&self) -> ProductUuid {
        self.uuid
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Undiscounted unit price
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Discount applied to the unit price
    pub fn discount(&self) -> Discount {
        self.discount
    }

    /// Units available
    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Whether at least one unit can be sold.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Unit price after the discount.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the discounted amount cannot be represented.
    pub fn effective_price(&self) -> Result<Money<'a, Currency>, PricingError> {
        effective_unit_price(self.price, self.discount)
    }
}
