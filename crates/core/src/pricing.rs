//! Pricing
//!
//! Pure price arithmetic for carts. Amounts are held as [`Money`] in the
//! currency's minor unit; discounts are whole percentages rounded down to
//! the minor unit.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{discounts::Discount, quantity::Quantity};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Prices must not be negative.
    #[error("price must not be negative, got {0} minor units")]
    NegativePrice(i64),

    /// The discounted amount could not be represented in minor units.
    #[error("discounted price could not be represented in minor units")]
    PriceConversion,

    /// A line or cart total exceeded the representable range.
    #[error("price total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Unit price after discount: `price - price * discount / 100`, rounded down.
///
/// # Errors
///
/// - [`PricingError::NegativePrice`]: `price` is below zero.
/// - [`PricingError::PriceConversion`]: the result does not fit in minor units.
pub fn effective_unit_price(
    price: Money<'_, Currency>,
    discount: Discount,
) -> Result<Money<'_, Currency>, PricingError> {
    let minor = price.to_minor_units();

    if minor < 0 {
        return Err(PricingError::NegativePrice(minor));
    }

    if discount.is_none() {
        return Ok(price);
    }

    let base = Decimal::from(minor);
    let reduction = discount.as_percentage() * base;

    let effective = base
        .checked_sub(reduction)
        .ok_or(PricingError::PriceConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::ToNegativeInfinity)
        .to_i64()
        .ok_or(PricingError::PriceConversion)?;

    Ok(Money::from_minor(effective, price.currency()))
}

/// Multiplies a unit price by a line quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product overflows.
pub fn line_total(
    unit_price: Money<'_, Currency>,
    quantity: Quantity,
) -> Result<Money<'_, Currency>, PricingError> {
    let total = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity.get()))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(total, unit_price.currency()))
}

/// A cart line resolved against its product's price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine<'a> {
    /// Undiscounted unit price.
    pub base_price: Money<'a, Currency>,

    /// Discount applied to each unit.
    pub discount: Discount,

    /// Units on the line.
    pub quantity: Quantity,
}

impl<'a> PricedLine<'a> {
    /// Creates a priced line.
    pub fn new(base_price: Money<'a, Currency>, discount: Discount, quantity: Quantity) -> Self {
        Self {
            base_price,
            discount,
            quantity,
        }
    }

    /// Discounted unit price.
    ///
    /// # Errors
    ///
    /// See [`effective_unit_price`].
    pub fn unit_price(&self) -> Result<Money<'a, Currency>, PricingError> {
        effective_unit_price(self.base_price, self.discount)
    }

    /// Undiscounted line total.
    ///
    /// # Errors
    ///
    /// See [`line_total`].
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        line_total(self.base_price, self.quantity)
    }

    /// Discounted line total.
    ///
    /// # Errors
    ///
    /// See [`effective_unit_price`] and [`line_total`].
    pub fn total(&self) -> Result<Money<'a, Currency>, PricingError> {
        line_total(self.unit_price()?, self.quantity)
    }
}

/// Aggregate figures for a whole cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    /// Units across all lines.
    pub total_quantity: u64,

    /// Sum of undiscounted line totals.
    pub subtotal: Money<'a, Currency>,

    /// Sum of discounted line totals.
    pub total_price: Money<'a, Currency>,

    /// `subtotal - total_price`.
    pub savings: Money<'a, Currency>,
}

impl<'a> CartTotals<'a> {
    /// Totals of an empty cart.
    pub fn empty(currency: &'a Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Self {
            total_quantity: 0,
            subtotal: zero,
            total_price: zero,
            savings: zero,
        }
    }
}

/// Sums quantities and prices over `lines`.
///
/// The result does not depend on the order of `lines`. An empty iterator
/// yields zero totals in `currency`.
///
/// # Errors
///
/// - [`PricingError::Money`]: a line is priced in a currency other than `currency`.
/// - [`PricingError::Overflow`]: a line or cart total overflowed.
pub fn compute_totals<'a, 'l, I>(
    lines: I,
    currency: &'a Currency,
) -> Result<CartTotals<'a>, PricingError>
where
    'a: 'l,
    I: IntoIterator<Item = &'l PricedLine<'a>>,
{
    let totals = lines
        .into_iter()
        .try_fold(CartTotals::empty(currency), |acc, line| {
            let total_quantity = acc
                .total_quantity
                .checked_add(u64::from(line.quantity.get()))
                .ok_or(PricingError::Overflow)?;

            Ok::<_, PricingError>(CartTotals {
                total_quantity,
                subtotal: acc.subtotal.add(line.subtotal()?)?,
                total_price: acc.total_price.add(line.total()?)?,
                savings: acc.savings,
            })
        })?;

    Ok(CartTotals {
        savings: totals.subtotal.sub(totals.total_price)?,
        ..totals
    })
}
