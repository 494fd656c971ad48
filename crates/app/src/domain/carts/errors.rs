//! Carts service errors.

use eatease::{
    cart::{CartError, CartLineUuid},
    pricing::PricingError,
    products::ProductUuid,
    quantity::QuantityError,
};
use thiserror::Error;

use crate::domain::products::ProductsServiceError;

/// Failures persisting carts.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cart storage io error")]
    Io(#[from] std::io::Error),

    #[error("cart storage is corrupt")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("product {0} is unknown or out of stock")]
    InvalidReference(ProductUuid),

    #[error("cart line {0} not found")]
    NotFound(CartLineUuid),

    #[error("cart line {0} already exists")]
    AlreadyExists(CartLineUuid),

    #[error("invalid quantity")]
    InvalidQuantity(#[source] QuantityError),

    #[error("failed to price cart")]
    Pricing(#[source] PricingError),

    #[error("product lookup failed")]
    Products(#[source] ProductsServiceError),

    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl From<CartError> for CartsServiceError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::InvalidReference(product) => Self::InvalidReference(product),
            CartError::NotFound(line) => Self::NotFound(line),
            CartError::LineExists(line) => Self::AlreadyExists(line),
            CartError::InvalidQuantity(source) => Self::InvalidQuantity(source),
            CartError::Pricing(source) => Self::Pricing(source),
        }
    }
}

impl From<ProductsServiceError> for CartsServiceError {
    fn from(error: ProductsServiceError) -> Self {
        match error {
            ProductsServiceError::NotFound(product) => Self::InvalidReference(product),
            other @ ProductsServiceError::Catalog(_) => Self::Products(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_product_maps_to_invalid_reference() {
        let product = ProductUuid::new();

        let error = CartsServiceError::from(ProductsServiceError::NotFound(product));

        assert!(matches!(error, CartsServiceError::InvalidReference(uuid) if uuid == product));
    }

    #[test]
    fn cart_quantity_errors_keep_their_source() {
        let error = CartsServiceError::from(CartError::InvalidQuantity(QuantityError::Zero));

        assert!(matches!(
            error,
            CartsServiceError::InvalidQuantity(QuantityError::Zero)
        ));
    }
}
