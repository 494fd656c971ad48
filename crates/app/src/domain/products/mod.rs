//! Products

pub mod errors;
mod repository;

pub use errors::ProductsServiceError;
pub use repository::*;
