//! In-memory Carts Repository

use async_trait::async_trait;
use eatease::cart::{Cart, UserUuid};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::domain::carts::errors::StorageError;

use super::CartsRepository;

#[derive(Debug, Default)]
pub struct InMemoryCartsRepository {
    carts: RwLock<FxHashMap<UserUuid, Cart>>,
}

impl InMemoryCartsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartsRepository for InMemoryCartsRepository {
    async fn load_cart(&self, owner: UserUuid) -> Result<Option<Cart>, StorageError> {
        Ok(self.carts.read().await.get(&owner).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), StorageError> {
        self.carts.write().await.insert(cart.owner(), cart.clone());

        Ok(())
    }

    async fn delete_cart(&self, owner: UserUuid) -> Result<bool, StorageError> {
        Ok(self.carts.write().await.remove(&owner).is_some())
    }
}
