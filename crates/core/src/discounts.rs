//! Discounts

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while building a [`Discount`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// The percentage fell outside `0..=100`.
    #[error("discount must be between 0 and 100 percent, got {0}")]
    OutOfRange(i64),

    /// The value could not be read as a whole percentage.
    #[error("invalid discount format: {0}")]
    InvalidFormat(String),
}

/// Whole-percent product discount, between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Discount(u8);

impl Discount {
    /// No discount.
    pub const NONE: Self = Self(0);

    /// Largest discount a product can carry.
    pub const MAX_PERCENT: u8 = 100;

    /// Creates a discount of `percent` percent.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::OutOfRange`] when `percent` is above 100.
    pub fn new(percent: u8) -> Result<Self, DiscountError> {
        if percent > Self::MAX_PERCENT {
            return Err(DiscountError::OutOfRange(i64::from(percent)));
        }

        Ok(Self(percent))
    }

    /// Whole percentage value.
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Whether the discount leaves prices untouched.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Fractional form (20% becomes 0.20) for decimal arithmetic.
    pub fn as_percentage(self) -> Percentage {
        Percentage::from(Decimal::from(self.0) / Decimal::ONE_HUNDRED)
    }
}

impl TryFrom<i64> for Discount {
    type Error = DiscountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_err| DiscountError::OutOfRange(value))
            .and_then(Self::new)
    }
}

impl FromStr for Discount {
    type Err = DiscountError;

    /// Accepts `"20"` or `"20%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

        let value = digits
            .parse::<i64>()
            .map_err(|_err| DiscountError::InvalidFormat(s.to_string()))?;

        Self::try_from(value)
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
