//! Carts

pub mod errors;
pub mod models;
mod repositories;
pub mod service;

pub use errors::{CartsServiceError, StorageError};
pub use repositories::*;
pub use service::*;
