//! JSON file Carts Repository
//!
//! Keeps every cart in a single JSON document. Writes go to a sibling
//! temporary file that is then renamed over the original.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use eatease::cart::{Cart, UserUuid};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::domain::carts::errors::StorageError;

use super::CartsRepository;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CartsDocument {
    carts: Vec<Cart>,
}

#[derive(Debug)]
pub struct JsonFileCartsRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCartsRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<CartsDocument, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(CartsDocument::default()),
            Err(error) => Err(error.into()),
        }
    }

    async fn write(&self, document: &CartsDocument) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, bytes).await?;
        fs::rename(&staging, &self.path).await?;

        debug!(path = %self.path.display(), carts = document.carts.len(), "wrote carts file");

        Ok(())
    }
}

#[async_trait]
impl CartsRepository for JsonFileCartsRepository {
    async fn load_cart(&self, owner: UserUuid) -> Result<Option<Cart>, StorageError> {
        let _guard = self.lock.lock().await;

        let document = self.read().await?;

        Ok(document.carts.into_iter().find(|cart| cart.owner() == owner))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut document = self.read().await?;

        match document
            .carts
            .iter_mut()
            .find(|stored| stored.owner() == cart.owner())
        {
            Some(stored) => stored.clone_from(cart),
            None => document.carts.push(cart.clone()),
        }

        self.write(&document).await
    }

    async fn delete_cart(&self, owner: UserUuid) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;

        let mut document = self.read().await?;
        let before = document.carts.len();

        document.carts.retain(|cart| cart.owner() != owner);

        if document.carts.len() == before {
            return Ok(false);
        }

        self.write(&document).await?;

        Ok(true)
    }
}
