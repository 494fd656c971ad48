//! Cart Repositories

use async_trait::async_trait;
use eatease::cart::{Cart, UserUuid};
use mockall::automock;

use crate::domain::carts::errors::StorageError;

mod file;
mod memory;

pub use file::JsonFileCartsRepository;
pub use memory::InMemoryCartsRepository;

#[automock]
#[async_trait]
pub trait CartsRepository: Send + Sync {
    /// Load the cart owned by `owner`, if one has been created.
    async fn load_cart(&self, owner: UserUuid) -> Result<Option<Cart>, StorageError>;

    /// Store `cart`, replacing any previous version for its owner.
    async fn save_cart(&self, cart: &Cart) -> Result<(), StorageError>;

    /// Delete the cart owned by `owner`. Returns whether one existed.
    async fn delete_cart(&self, owner: UserUuid) -> Result<bool, StorageError>;
}
