//! Products repository errors.

use eatease::{fixtures::FixtureError, products::ProductUuid};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product {0} not found")]
    NotFound(ProductUuid),

    #[error("failed to load product catalog: {0}")]
    Catalog(#[from] FixtureError),
}
