//! Quantities

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a requested line quantity is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// A stored line can never hold zero units.
    #[error("quantity must be at least 1")]
    Zero,

    /// Negative quantities are meaningless.
    #[error("quantity must not be negative, got {0}")]
    Negative(i64),

    /// Quantities are whole units only.
    #[error("quantity must be a whole number, got {0}")]
    NotInteger(String),

    /// The quantity would not fit in the line.
    #[error("quantity is too large")]
    Overflow,
}

/// Number of units on a cart line. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Creates a quantity of `units`.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] when `units` is zero.
    pub fn new(units: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(units).map(Self).ok_or(QuantityError::Zero)
    }

    /// Number of units.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// One more unit.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Overflow`] at `u32::MAX`.
    pub fn increment(self) -> Result<Self, QuantityError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(QuantityError::Overflow)
    }

    /// One fewer unit, or `None` when the line would reach zero.
    #[must_use]
    pub fn decrement(self) -> Option<Self> {
        NonZeroU32::new(self.0.get() - 1).map(Self)
    }

    /// Parses user input, rejecting negative, zero and fractional values.
    ///
    /// # Errors
    ///
    /// Returns the matching [`QuantityError`] variant for unusable input.
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let trimmed = input.trim();

        if let Ok(whole) = trimmed.parse::<i64>() {
            return Self::try_from(whole);
        }

        let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

        if !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(QuantityError::Overflow);
        }

        Err(QuantityError::NotInteger(trimmed.to_string()))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(QuantityError::Negative(value));
        }

        let units = u32::try_from(value).map_err(|_err| QuantityError::Overflow)?;

        Self::new(units)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
