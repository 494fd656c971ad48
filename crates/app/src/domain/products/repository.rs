//! Products repository.

use std::path::Path;

use async_trait::async_trait;
use eatease::{
    catalog::{Catalog, ProductCatalog},
    fixtures::catalog_from_path,
    products::{Product, ProductUuid},
};
use mockall::automock;
use rusty_money::iso::Currency;
use tracing::debug;

use crate::domain::products::errors::ProductsServiceError;

/// Catalog held in memory, loaded once at startup.
#[derive(Debug, Clone)]
pub struct InMemoryProductsRepository {
    catalog: ProductCatalog<'static>,
}

impl InMemoryProductsRepository {
    #[must_use]
    pub fn new(catalog: ProductCatalog<'static>) -> Self {
        Self { catalog }
    }

    /// Load the catalog from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsServiceError::Catalog`] if the file is missing or malformed.
    #[tracing::instrument(name = "products.repository.from_path", skip(path), err)]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProductsServiceError> {
        let catalog = catalog_from_path(path)?;

        debug!(product_count = catalog.len(), "loaded product catalog");

        Ok(Self::new(catalog))
    }

    /// Currency every product is priced in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.catalog.currency()
    }
}

#[async_trait]
impl ProductsRepository for InMemoryProductsRepository {
    async fn list_products(&self) -> Result<Vec<Product<'static>>, ProductsServiceError> {
        let mut products: Vec<_> = self.catalog.products().cloned().collect();

        products.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(products)
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<Product<'static>, ProductsServiceError> {
        self.catalog
            .product(product)
            .cloned()
            .ok_or(ProductsServiceError::NotFound(product))
    }
}

#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Retrieves all products, ordered by name.
    async fn list_products(&self) -> Result<Vec<Product<'static>>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<Product<'static>, ProductsServiceError>;
}
