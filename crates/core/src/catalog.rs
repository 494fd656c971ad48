//! Catalog
//!
//! Read-only product lookup used to resolve cart lines into prices.

use std::{collections::HashMap, hash::BuildHasher};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::products::{Product, ProductUuid};

/// Anything that can resolve a product UUID into a product.
pub trait Catalog<'a> {
    /// Look up a single product.
    fn product(&self, uuid: ProductUuid) -> Option<&Product<'a>>;
}

impl<'a, S: BuildHasher> Catalog<'a> for HashMap<ProductUuid, Product<'a>, S> {
    fn product(&self, uuid: ProductUuid) -> Option<&Product<'a>> {
        self.get(&uuid)
    }
}

impl<'a> Catalog<'a> for [Product<'a>] {
    fn product(&self, uuid: ProductUuid) -> Option<&Product<'a>> {
        self.iter().find(|product| product.uuid() == uuid)
    }
}

/// Errors raised while assembling a [`ProductCatalog`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Every product in a catalog must share one currency.
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Catalog currency code
        expected: &'static str,
        /// Offending product currency code
        found: &'static str,
    },

    /// Two products were registered under the same UUID.
    #[error("duplicate product: {0}")]
    DuplicateProduct(ProductUuid),
}

/// Products keyed by UUID, all priced in one currency.
#[derive(Debug, Clone)]
pub struct ProductCatalog<'a> {
    products: FxHashMap<ProductUuid, Product<'a>>,
    currency: &'a Currency,
}

impl<'a> ProductCatalog<'a> {
    /// Creates an empty catalog priced in `currency`.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            products: FxHashMap::default(),
            currency,
        }
    }

    /// Adds a product to the catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CurrencyMismatch`]: the product is priced in another currency.
    /// - [`CatalogError::DuplicateProduct`]: the UUID is already taken.
    pub fn insert(&mut self, product: Product<'a>) -> Result<(), CatalogError> {
        let currency = product.price().currency();

        if currency != self.currency {
            return Err(CatalogError::CurrencyMismatch {
                expected: self.currency.iso_alpha_code,
                found: currency.iso_alpha_code,
            });
        }

        if self.products.contains_key(&product.uuid()) {
            return Err(CatalogError::DuplicateProduct(product.uuid()));
        }

        self.products.insert(product.uuid(), product);

        Ok(())
    }

    /// Builds a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// See [`ProductCatalog::insert`].
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'a Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        products
            .into_iter()
            .try_for_each(|product| catalog.insert(product))?;

        Ok(catalog)
    }

    /// Catalog currency
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Iterate over all products, in no particular order.
    pub fn products(&self) -> impl Iterator<Item = &Product<'a>> {
        self.products.values()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> Catalog<'a> for ProductCatalog<'a> {
    fn product(&self, uuid: ProductUuid) -> Option<&Product<'a>> {
        self.products.get(&uuid)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, VND},
    };
    use testresult::TestResult;

    use crate::discounts::Discount;

    use super::*;

    fn product(
        price: Money<'static, Currency>,
    ) -> Result<Product<'static>, crate::products::ProductError> {
        Product::new(ProductUuid::new(), "Banh mi", price, Discount::NONE, 3)
    }

    #[test]
    fn lookup_by_uuid() -> TestResult {
        let banh_mi = product(Money::from_minor(25_000, VND))?;
        let uuid = banh_mi.uuid();

        let catalog = ProductCatalog::with_products([banh_mi], VND)?;

        assert_eq!(catalog.product(uuid).map(Product::name), Some("Banh mi"));
        assert!(catalog.product(ProductUuid::new()).is_none());

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() -> TestResult {
        let result = ProductCatalog::with_products([product(Money::from_minor(100, GBP))?], VND);

        assert_eq!(
            result.map(|catalog| catalog.len()),
            Err(CatalogError::CurrencyMismatch {
                expected: "VND",
                found: "GBP",
            })
        );

        Ok(())
    }

    #[test]
    fn duplicate_uuid_is_rejected() -> TestResult {
        let first = product(Money::from_minor(25_000, VND))?;
        let duplicate = first.clone();
        let uuid = first.uuid();

        let result = ProductCatalog::with_products([first, duplicate], VND);

        assert!(matches!(result, Err(CatalogError::DuplicateProduct(found)) if found == uuid));

        Ok(())
    }

    #[test]
    fn slices_act_as_catalogs() -> TestResult {
        let products = [product(Money::from_minor(25_000, VND))?];
        let uuid = products.first().map(Product::uuid).ok_or("missing product")?;

        assert!(products.as_slice().product(uuid).is_some());

        Ok(())
    }
}
