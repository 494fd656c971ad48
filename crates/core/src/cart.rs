//! Cart
//!
//! The authoritative set of line items for one user. Every line holds at
//! least one unit; a line that would drop to zero is removed instead.

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    pricing::{CartTotals, PricedLine, PricingError, compute_totals},
    products::{Product, ProductUuid},
    quantity::{Quantity, QuantityError},
    uuids::TypedUuid,
};

/// Cart owner marker.
#[derive(Debug)]
pub enum Shopper {}

/// UUID of the user that owns a cart.
pub type UserUuid = TypedUuid<Shopper>;

/// Cart line UUID
pub type CartLineUuid = TypedUuid<CartLineItem>;

/// Errors raised by cart operations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product is unknown or has no stock.
    #[error("product {0} is unknown or out of stock")]
    InvalidReference(ProductUuid),

    /// No line with this UUID is in the cart.
    #[error("cart line {0} not found")]
    NotFound(CartLineUuid),

    /// A line with this UUID already exists for a different product.
    #[error("cart line {0} already exists")]
    LineExists(CartLineUuid),

    /// The requested quantity is not a positive whole number.
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),

    /// Line prices could not be aggregated.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// One product and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Line UUID
    pub uuid: CartLineUuid,

    /// Product on this line
    pub product_uuid: ProductUuid,

    /// Units, never zero
    pub quantity: Quantity,
}

impl CartLineItem {
    /// A fresh single-unit line.
    pub fn new(uuid: CartLineUuid, product_uuid: ProductUuid) -> Self {
        Self {
            uuid,
            product_uuid,
            quantity: Quantity::ONE,
        }
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created.
    Added(CartLineUuid),

    /// The product already had a line; nothing changed.
    AlreadyPresent(CartLineUuid),
}

impl AddOutcome {
    /// The line holding the product.
    pub fn line(self) -> CartLineUuid {
        match self {
            Self::Added(line) | Self::AlreadyPresent(line) => line,
        }
    }
}

/// A user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    owner: UserUuid,
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart for `owner`.
    pub fn new(owner: UserUuid) -> Self {
        Self {
            owner,
            lines: Vec::new(),
        }
    }

    pub(crate) fn from_lines(owner: UserUuid, lines: Vec<CartLineItem>) -> Self {
        Self { owner, lines }
    }

    /// Cart owner
    pub fn owner(&self) -> UserUuid {
        self.owner
    }

    /// Lines, in insertion order.
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Look up a line by UUID.
    pub fn line(&self, uuid: CartLineUuid) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.uuid == uuid)
    }

    /// Look up the line holding `product`.
    pub fn line_for_product(&self, product: ProductUuid) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.product_uuid == product)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Adds one unit of `product` on a new line called `line`.
    ///
    /// Adding a product that already has a line leaves the cart unchanged and
    /// reports the existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidReference`]: the product has no stock.
    /// - [`CartError::LineExists`]: `line` is already used by another product.
    pub fn add(
        &mut self,
        line: CartLineUuid,
        product: &Product<'_>,
    ) -> Result<AddOutcome, CartError> {
        if !product.is_in_stock() {
            return Err(CartError::InvalidReference(product.uuid()));
        }

        if let Some(existing) = self.line_for_product(product.uuid()) {
            return Ok(AddOutcome::AlreadyPresent(existing.uuid));
        }

        if self.line(line).is_some() {
            return Err(CartError::LineExists(line));
        }

        self.lines.push(CartLineItem::new(line, product.uuid()));

        Ok(AddOutcome::Added(line))
    }

    /// Adds one unit to a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotFound`]: no such line.
    /// - [`CartError::InvalidQuantity`]: the quantity would overflow.
    pub fn increment(&mut self, line: CartLineUuid) -> Result<&CartLineItem, CartError> {
        let item = self.line_mut(line)?;

        item.quantity = item.quantity.increment()?;

        Ok(item)
    }

    /// Removes one unit from a line, deleting the line when it reaches zero.
    ///
    /// Returns the updated line, or `None` when the line was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if there is no such line.
    pub fn decrement(&mut self, line: CartLineUuid) -> Result<Option<&CartLineItem>, CartError> {
        let index = self.position(line)?;

        let Some(item) = self.lines.get_mut(index) else {
            return Err(CartError::NotFound(line));
        };

        match item.quantity.decrement() {
            Some(quantity) => {
                item.quantity = quantity;

                Ok(self.lines.get(index))
            }
            None => {
                self.lines.remove(index);

                Ok(None)
            }
        }
    }

    /// Sets the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if there is no such line.
    pub fn set_quantity(
        &mut self,
        line: CartLineUuid,
        quantity: Quantity,
    ) -> Result<&CartLineItem, CartError> {
        let item = self.line_mut(line)?;

        item.quantity = quantity;

        Ok(item)
    }

    /// Deletes a line regardless of its quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if there is no such line.
    pub fn remove(&mut self, line: CartLineUuid) -> Result<CartLineItem, CartError> {
        let index = self.position(line)?;

        Ok(self.lines.remove(index))
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Resolves every line against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidReference`] for a line whose product is
    /// missing from the catalog.
    pub fn priced_lines<'a, C>(&self, catalog: &C) -> Result<Vec<PricedLine<'a>>, CartError>
    where
        C: Catalog<'a> + ?Sized,
    {
        self.lines
            .iter()
            .map(|line| {
                catalog
                    .product(line.product_uuid)
                    .map(|product| {
                        PricedLine::new(*product.price(), product.discount(), line.quantity)
                    })
                    .ok_or(CartError::InvalidReference(line.product_uuid))
            })
            .collect()
    }

    /// Computes quantity and price totals.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidReference`]: a product is missing from the catalog.
    /// - [`CartError::Pricing`]: aggregation failed.
    pub fn totals<'a, C>(
        &self,
        catalog: &C,
        currency: &'a Currency,
    ) -> Result<CartTotals<'a>, CartError>
    where
        C: Catalog<'a> + ?Sized,
    {
        let lines = self.priced_lines(catalog)?;

        Ok(compute_totals(&lines, currency)?)
    }

    fn position(&self, line: CartLineUuid) -> Result<usize, CartError> {
        self.lines
            .iter()
            .position(|item| item.uuid == line)
            .ok_or(CartError::NotFound(line))
    }

    fn line_mut(&mut self, line: CartLineUuid) -> Result<&mut CartLineItem, CartError> {
        self.lines
            .iter_mut()
            .find(|item| item.uuid == line)
            .ok_or(CartError::NotFound(line))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::VND};
    use testresult::TestResult;

    use crate::{catalog::ProductCatalog, discounts::Discount};

    use super::*;

    fn product(
        price: i64,
        discount: u8,
        stock: u32,
    ) -> Result<Product<'static>, Box<dyn std::error::Error>> {
        Ok(Product::new(
            ProductUuid::new(),
            "Com tam",
            Money::from_minor(price, VND),
            Discount::new(discount)?,
            stock,
        )?)
    }

    #[test]
    fn add_creates_single_unit_line() -> TestResult {
        let product = product(50_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());
        let line = CartLineUuid::new();

        let outcome = cart.add(line, &product)?;

        assert_eq!(outcome, AddOutcome::Added(line));
        assert_eq!(cart.line(line).map(|item| item.quantity), Some(Quantity::ONE));

        Ok(())
    }

    #[test]
    fn add_existing_product_is_a_no_op() -> TestResult {
        let product = product(50_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());
        let first = CartLineUuid::new();

        cart.add(first, &product)?;
        let outcome = cart.add(CartLineUuid::new(), &product)?;

        assert_eq!(outcome, AddOutcome::AlreadyPresent(first));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 1);

        Ok(())
    }

    #[test]
    fn add_out_of_stock_is_invalid_reference() -> TestResult {
        let product = product(50_000, 0, 0)?;
        let mut cart = Cart::new(UserUuid::new());

        let result = cart.add(CartLineUuid::new(), &product);

        assert_eq!(result, Err(CartError::InvalidReference(product.uuid())));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn add_reusing_line_uuid_for_other_product_fails() -> TestResult {
        let first = product(50_000, 0, 10)?;
        let second = product(30_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());
        let line = CartLineUuid::new();

        cart.add(line, &first)?;

        assert_eq!(cart.add(line, &second), Err(CartError::LineExists(line)));

        Ok(())
    }

    #[test]
    fn increment_missing_line_is_not_found() {
        let mut cart = Cart::new(UserUuid::new());
        let line = CartLineUuid::new();

        assert_eq!(cart.increment(line), Err(CartError::NotFound(line)));
    }

    #[test]
    fn decrement_to_zero_removes_line() -> TestResult {
        let product = product(50_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());
        let line = CartLineUuid::new();

        cart.add(line, &product)?;
        let before = cart.total_quantity();

        assert_eq!(cart.decrement(line)?, None);
        assert!(cart.line(line).is_none());
        assert_eq!(cart.total_quantity(), before - 1);

        Ok(())
    }

    #[test]
    fn decrement_above_one_keeps_line() -> TestResult {
        let product = product(50_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());
        let line = CartLineUuid::new();

        cart.add(line, &product)?;
        cart.increment(line)?;
        cart.increment(line)?;

        let quantity = cart.decrement(line)?.map(|item| item.quantity);

        assert_eq!(quantity, Some(Quantity::new(2)?));

        Ok(())
    }

    #[test]
    fn remove_missing_line_is_not_found() {
        let mut cart = Cart::new(UserUuid::new());
        let line = CartLineUuid::new();

        assert_eq!(cart.remove(line), Err(CartError::NotFound(line)));
    }

    #[test]
    fn set_quantity_overwrites() -> TestResult {
        let product = product(50_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());
        let line = CartLineUuid::new();

        cart.add(line, &product)?;
        cart.set_quantity(line, Quantity::new(7)?)?;

        assert_eq!(cart.total_quantity(), 7);

        Ok(())
    }

    #[test]
    fn totals_fail_for_products_missing_from_catalog() -> TestResult {
        let product = product(50_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());

        cart.add(CartLineUuid::new(), &product)?;

        let catalog = ProductCatalog::new(VND);

        assert_eq!(
            cart.totals(&catalog, VND),
            Err(CartError::InvalidReference(product.uuid()))
        );

        Ok(())
    }

    #[test]
    fn clear_empties_cart() -> TestResult {
        let product = product(50_000, 0, 10)?;
        let mut cart = Cart::new(UserUuid::new());

        cart.add(CartLineUuid::new(), &product)?;
        cart.clear();

        assert!(cart.is_empty());

        Ok(())
    }
}
