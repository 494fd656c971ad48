//! Catalog Fixtures
//!
//! Loads a [`ProductCatalog`] from YAML:
//!
//! ```yaml
//! currency: VND
//! products:
//!   pho:
//!     uuid: 01890a5d-ac96-774b-bcce-b302099a8057
//!     name: Pho bo
//!     price: "100000 VND"
//!     discount: "20%"
//!     stock: 12
//! ```

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD, VND},
};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::{CatalogError, ProductCatalog},
    discounts::{Discount, DiscountError},
    products::{Product, ProductError, ProductUuid},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid discount
    #[error("Invalid discount for {key}: {source}")]
    InvalidDiscount {
        /// Product fixture key
        key: String,
        /// Underlying error
        #[source]
        source: DiscountError,
    },

    /// Invalid product data
    #[error("Invalid product {key}: {source}")]
    InvalidProduct {
        /// Product fixture key
        key: String,
        /// Underlying error
        #[source]
        source: ProductError,
    },

    /// Catalog assembly error
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Wrapper for the catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Catalog currency code (e.g., "VND")
    pub currency: String,

    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Stable product UUID
    pub uuid: Uuid,

    /// Product name
    pub name: String,

    /// Product price (e.g., "100000 VND")
    pub price: String,

    /// Discount (e.g., "20%"), none when omitted
    #[serde(default)]
    pub discount: Option<String>,

    /// Units in stock
    pub stock: u32,
}

impl ProductFixture {
    /// Converts the fixture stored under `key` into a product.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] for malformed prices, discounts or product data.
    pub fn into_product(self, key: &str) -> Result<Product<'static>, FixtureError> {
        let (minor_units, currency) = parse_price(&self.price)?;

        let discount = match self.discount.as_deref() {
            Some(discount) => discount
                .parse::<Discount>()
                .map_err(|source| FixtureError::InvalidDiscount {
                    key: key.to_string(),
                    source,
                })?,
            None => Discount::NONE,
        };

        Product::new(
            ProductUuid::from_uuid(self.uuid),
            self.name,
            Money::from_minor(minor_units, currency),
            discount,
            self.stock,
        )
        .map_err(|source| FixtureError::InvalidProduct {
            key: key.to_string(),
            source,
        })
    }
}

impl CatalogFixture {
    /// Converts the fixture into a catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if any product is malformed or priced in a
    /// currency other than the catalog's.
    pub fn into_catalog(self) -> Result<ProductCatalog<'static>, FixtureError> {
        let mut catalog = ProductCatalog::new(currency(&self.currency)?);

        for (key, fixture) in self.products {
            catalog.insert(fixture.into_product(&key)?)?;
        }

        Ok(catalog)
    }
}

/// Parses a YAML catalog.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the YAML or any product is invalid.
pub fn catalog_from_str(yaml: &str) -> Result<ProductCatalog<'static>, FixtureError> {
    serde_norway::from_str::<CatalogFixture>(yaml)?.into_catalog()
}

/// Reads and parses a YAML catalog file.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the file cannot be read or is invalid.
pub fn catalog_from_path(path: impl AsRef<Path>) -> Result<ProductCatalog<'static>, FixtureError> {
    catalog_from_str(&fs::read_to_string(path)?)
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = currency(code)?;

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

fn currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "VND" => Ok(VND),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
