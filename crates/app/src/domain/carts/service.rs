//! Carts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use eatease::{
    cart::{AddOutcome, Cart, CartError, CartLineItem, CartLineUuid, UserUuid},
    pricing::{CartTotals, PricedLine, compute_totals},
    products::Product,
    quantity::Quantity,
};
use mockall::automock;
use rusty_money::iso::Currency;
use tokio::sync::Mutex;
use tracing::{Span, debug, info, warn};

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        models::{CartSummary, CartSummaryLine, NewCartItem},
        repositories::CartsRepository,
    },
    products::ProductsRepository,
};

/// Cart service backed by a products repository and a carts repository.
///
/// Every mutation loads the cart, applies the change and saves it while
/// holding a single writer lock, so concurrent calls never interleave.
pub struct StoreCartsService {
    products: Arc<dyn ProductsRepository>,
    carts: Arc<dyn CartsRepository>,
    currency: &'static Currency,
    writer: Mutex<()>,
}

impl fmt::Debug for StoreCartsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCartsService")
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl StoreCartsService {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductsRepository>,
        carts: Arc<dyn CartsRepository>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            products,
            carts,
            currency,
            writer: Mutex::new(()),
        }
    }

    async fn load(&self, owner: UserUuid) -> Result<Cart, CartsServiceError> {
        Ok(self
            .carts
            .load_cart(owner)
            .await?
            .unwrap_or_else(|| Cart::new(owner)))
    }

    async fn mutate<T, F>(&self, owner: UserUuid, change: F) -> Result<T, CartsServiceError>
    where
        F: FnOnce(&mut Cart) -> Result<T, CartError> + Send,
        T: Send,
    {
        let _guard = self.writer.lock().await;

        let mut cart = self.load(owner).await?;

        let value = change(&mut cart).inspect_err(|error| {
            warn!(%owner, %error, "rejected cart mutation");
        })?;

        self.carts.save_cart(&cart).await?;

        Span::current().record("line_count", cart.len());

        Ok(value)
    }

    async fn priced(
        &self,
        cart: &Cart,
    ) -> Result<Vec<(CartLineItem, Product<'static>)>, CartsServiceError> {
        let mut lines = Vec::with_capacity(cart.len());

        for line in cart.lines() {
            let product = self.products.get_product(line.product_uuid).await?;

            lines.push((line.clone(), product));
        }

        Ok(lines)
    }
}

#[async_trait]
impl CartsService for StoreCartsService {
    #[tracing::instrument(name = "carts.service.get_cart", skip(self), fields(owner = %owner), err)]
    async fn get_cart(&self, owner: UserUuid) -> Result<Cart, CartsServiceError> {
        self.load(owner).await
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(
            owner = %owner,
            line_uuid = %item.uuid,
            product_uuid = %item.product_uuid,
            line_count = tracing::field::Empty
        ),
        err
    )]
    async fn add_item(
        &self,
        owner: UserUuid,
        item: NewCartItem,
    ) -> Result<AddOutcome, CartsServiceError> {
        let product = self.products.get_product(item.product_uuid).await?;

        let outcome = self
            .mutate(owner, |cart| cart.add(item.uuid, &product))
            .await?;

        match outcome {
            AddOutcome::Added(line) => info!(line_uuid = %line, "added cart line"),
            AddOutcome::AlreadyPresent(line) => {
                debug!(line_uuid = %line, "product already in cart");
            }
        }

        Ok(outcome)
    }

    #[tracing::instrument(
        name = "carts.service.increment_item",
        skip(self),
        fields(owner = %owner, line_uuid = %line, line_count = tracing::field::Empty),
        err
    )]
    async fn increment_item(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
    ) -> Result<CartLineItem, CartsServiceError> {
        let item = self
            .mutate(owner, |cart| cart.increment(line).cloned())
            .await?;

        debug!(quantity = item.quantity.get(), "incremented cart line");

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.decrement_item",
        skip(self),
        fields(owner = %owner, line_uuid = %line, line_count = tracing::field::Empty),
        err
    )]
    async fn decrement_item(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
    ) -> Result<Option<CartLineItem>, CartsServiceError> {
        let item = self
            .mutate(owner, |cart| Ok(cart.decrement(line)?.cloned()))
            .await?;

        match &item {
            Some(item) => debug!(quantity = item.quantity.get(), "decremented cart line"),
            None => info!("removed cart line at zero quantity"),
        }

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.set_item_quantity",
        skip(self),
        fields(
            owner = %owner,
            line_uuid = %line,
            quantity = %quantity,
            line_count = tracing::field::Empty
        ),
        err
    )]
    async fn set_item_quantity(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
        quantity: Quantity,
    ) -> Result<CartLineItem, CartsServiceError> {
        self.mutate(owner, |cart| cart.set_quantity(line, quantity).cloned())
            .await
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(owner = %owner, line_uuid = %line, line_count = tracing::field::Empty),
        err
    )]
    async fn remove_item(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
    ) -> Result<CartLineItem, CartsServiceError> {
        let item = self.mutate(owner, |cart| cart.remove(line)).await?;

        info!("removed cart line");

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.clear_cart",
        skip(self),
        fields(owner = %owner),
        err
    )]
    async fn clear_cart(&self, owner: UserUuid) -> Result<(), CartsServiceError> {
        let _guard = self.writer.lock().await;

        if self.carts.delete_cart(owner).await? {
            info!("cleared cart");
        }

        Ok(())
    }

    #[tracing::instrument(name = "carts.service.totals", skip(self), fields(owner = %owner), err)]
    async fn totals(&self, owner: UserUuid) -> Result<CartTotals<'static>, CartsServiceError> {
        Ok(self.summary(owner).await?.totals)
    }

    #[tracing::instrument(name = "carts.service.summary", skip(self), fields(owner = %owner), err)]
    async fn summary(&self, owner: UserUuid) -> Result<CartSummary, CartsServiceError> {
        let cart = self.load(owner).await?;

        let mut priced = Vec::with_capacity(cart.len());
        let mut lines = Vec::with_capacity(cart.len());

        for (line, product) in self.priced(&cart).await? {
            let priced_line = PricedLine::new(*product.price(), product.discount(), line.quantity);

            lines.push(CartSummaryLine {
                unit_price: priced_line.unit_price().map_err(CartsServiceError::Pricing)?,
                total: priced_line.total().map_err(CartsServiceError::Pricing)?,
                name: product.name().to_string(),
                discount: product.discount(),
                base_price: *product.price(),
                line,
            });

            priced.push(priced_line);
        }

        let totals = compute_totals(&priced, self.currency)
            .map_err(CartsServiceError::Pricing)?;

        Ok(CartSummary {
            owner,
            lines,
            totals,
        })
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve a cart; a user without one gets an empty cart.
    async fn get_cart(&self, owner: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add a product to the cart. Adding a product that is already present is a no-op.
    async fn add_item(
        &self,
        owner: UserUuid,
        item: NewCartItem,
    ) -> Result<AddOutcome, CartsServiceError>;

    /// Add one unit to a line.
    async fn increment_item(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
    ) -> Result<CartLineItem, CartsServiceError>;

    /// Remove one unit from a line. Returns `None` when the line was deleted.
    async fn decrement_item(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
    ) -> Result<Option<CartLineItem>, CartsServiceError>;

    /// Overwrite a line's quantity.
    async fn set_item_quantity(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
        quantity: Quantity,
    ) -> Result<CartLineItem, CartsServiceError>;

    /// Delete a line.
    async fn remove_item(
        &self,
        owner: UserUuid,
        line: CartLineUuid,
    ) -> Result<CartLineItem, CartsServiceError>;

    /// Empty the cart, e.g. on logout or after checkout.
    async fn clear_cart(&self, owner: UserUuid) -> Result<(), CartsServiceError>;

    /// Quantity and price totals.
    async fn totals(&self, owner: UserUuid) -> Result<CartTotals<'static>, CartsServiceError>;

    /// Priced lines and totals, for display.
    async fn summary(&self, owner: UserUuid) -> Result<CartSummary, CartsServiceError>;
}
