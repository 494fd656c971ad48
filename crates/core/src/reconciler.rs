//! Cart Reconciler
//!
//! Client-side view of a cart that applies mutations optimistically and
//! folds server responses back in as they arrive. Responses are matched to
//! lines by line UUID; for each line the response to the most recent
//! mutation wins and older responses arriving late are discarded.

use std::{collections::BTreeMap, fmt};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;

use crate::{
    cart::{Cart, CartError, CartLineItem, CartLineUuid, UserUuid},
    catalog::Catalog,
    pricing::CartTotals,
    products::{Product, ProductUuid},
    quantity::Quantity,
};

/// Monotonic identifier for an optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MutationId(u64);

impl MutationId {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a pending mutation asks the server to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Create the line for this product.
    Add(ProductUuid),

    /// One more unit.
    Increment,

    /// One fewer unit, deleting the line at zero.
    Decrement,

    /// Set an absolute quantity.
    SetQuantity(Quantity),

    /// Delete the line.
    Remove,
}

/// A mutation applied locally and awaiting a server response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMutation {
    /// Identifier to pass back to [`Reconciler::confirm`] or [`Reconciler::reject`].
    pub id: MutationId,

    /// Line the mutation targets.
    pub line: CartLineUuid,

    /// Requested change.
    pub kind: MutationKind,
}

/// How a server response was treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The response updated local state.
    Applied,

    /// A newer response for the same line was already applied, or the state
    /// was resynchronised after the mutation was issued.
    Stale,
}

#[derive(Debug, Clone)]
struct Overlay {
    state: Option<CartLineItem>,
    latest: MutationId,
}

/// Optimistic cart state for one user.
#[derive(Debug, Clone)]
pub struct Reconciler {
    owner: UserUuid,
    confirmed: BTreeMap<CartLineUuid, CartLineItem>,
    overlays: BTreeMap<CartLineUuid, Overlay>,
    applied: FxHashMap<CartLineUuid, MutationId>,
    in_flight: FxHashMap<CartLineUuid, usize>,
    stale_before: MutationId,
    next_id: u64,
}

impl Reconciler {
    /// Empty state for `owner`.
    pub fn new(owner: UserUuid) -> Self {
        Self {
            owner,
            confirmed: BTreeMap::new(),
            overlays: BTreeMap::new(),
            applied: FxHashMap::default(),
            in_flight: FxHashMap::default(),
            stale_before: MutationId(0),
            next_id: 0,
        }
    }

    /// Starts from a cart loaded from the server.
    pub fn from_cart(cart: &Cart) -> Self {
        let mut reconciler = Self::new(cart.owner());

        reconciler.confirmed = confirmed_lines(cart);

        reconciler
    }

    /// Cart owner
    pub fn owner(&self) -> UserUuid {
        self.owner
    }

    /// The line as currently displayed, including optimistic changes.
    pub fn line(&self, line: CartLineUuid) -> Option<&CartLineItem> {
        match self.overlays.get(&line) {
            Some(overlay) => overlay.state.as_ref(),
            None => self.confirmed.get(&line),
        }
    }

    /// Number of lines with an unconfirmed optimistic change.
    pub fn pending(&self) -> usize {
        self.overlays.len()
    }

    /// Whether every optimistic change has been confirmed or reverted.
    pub fn is_settled(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Optimistically adds one unit of `product`.
    ///
    /// Returns `None` without issuing a mutation when the product already has
    /// a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidReference`] if the product has no stock.
    pub fn add(&mut self, product: &Product<'_>) -> Result<Option<PendingMutation>, CartError> {
        if !product.is_in_stock() {
            return Err(CartError::InvalidReference(product.uuid()));
        }

        if self
            .visible_lines()
            .iter()
            .any(|line| line.product_uuid == product.uuid())
        {
            return Ok(None);
        }

        let line = CartLineItem::new(CartLineUuid::new(), product.uuid());
        let uuid = line.uuid;

        Ok(Some(self.issue(uuid, Some(line), MutationKind::Add(product.uuid()))))
    }

    /// Optimistically adds one unit to a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotFound`]: the line is not visible.
    /// - [`CartError::InvalidQuantity`]: the quantity would overflow.
    pub fn increment(&mut self, line: CartLineUuid) -> Result<PendingMutation, CartError> {
        let mut item = self.visible(line)?;

        item.quantity = item.quantity.increment()?;

        Ok(self.issue(line, Some(item), MutationKind::Increment))
    }

    /// Optimistically removes one unit, hiding the line when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the line is not visible.
    pub fn decrement(&mut self, line: CartLineUuid) -> Result<PendingMutation, CartError> {
        let mut item = self.visible(line)?;

        let state = item.quantity.decrement().map(|quantity| {
            item.quantity = quantity;
            item
        });

        Ok(self.issue(line, state, MutationKind::Decrement))
    }

    /// Optimistically sets a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the line is not visible.
    pub fn set_quantity(
        &mut self,
        line: CartLineUuid,
        quantity: Quantity,
    ) -> Result<PendingMutation, CartError> {
        let mut item = self.visible(line)?;

        item.quantity = quantity;

        Ok(self.issue(line, Some(item), MutationKind::SetQuantity(quantity)))
    }

    /// Optimistically deletes a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the line is not visible.
    pub fn remove(&mut self, line: CartLineUuid) -> Result<PendingMutation, CartError> {
        self.visible(line)?;

        Ok(self.issue(line, None, MutationKind::Remove))
    }

    /// Applies the server's answer to mutation `id` on `line`.
    ///
    /// `server` is the line as the server now stores it, or `None` when the
    /// server no longer has the line.
    pub fn confirm(
        &mut self,
        id: MutationId,
        line: CartLineUuid,
        server: Option<CartLineItem>,
    ) -> Reconciliation {
        let stale = self.is_stale(id, line);

        self.settle(id, line);

        if stale {
            self.forget_if_gone(line);

            return Reconciliation::Stale;
        }

        self.applied.insert(line, id);

        match server {
            Some(item) => {
                self.confirmed.insert(line, item);
            }
            None => {
                self.confirmed.remove(&line);
            }
        }

        if self
            .overlays
            .get(&line)
            .is_some_and(|overlay| overlay.latest <= id)
        {
            self.overlays.remove(&line);
        }

        self.forget_if_gone(line);

        Reconciliation::Applied
    }

    /// Reverts mutation `id` after the server refused it.
    ///
    /// The optimistic change is only rolled back when no newer mutation for
    /// the same line is in flight; otherwise the newer response settles it.
    pub fn reject(&mut self, id: MutationId, line: CartLineUuid) -> Reconciliation {
        let stale = self.is_stale(id, line);

        self.settle(id, line);

        let outcome = match self.overlays.get(&line) {
            Some(overlay) if !stale && overlay.latest == id => {
                self.overlays.remove(&line);

                Reconciliation::Applied
            }
            _ => Reconciliation::Stale,
        };

        self.forget_if_gone(line);

        outcome
    }

    /// Replaces all state with a freshly loaded server cart.
    ///
    /// Responses to mutations issued before the resync are treated as stale.
    pub fn resync(&mut self, cart: &Cart) {
        self.owner = cart.owner();
        self.confirmed = confirmed_lines(cart);
        self.overlays.clear();
        self.applied.clear();
        self.in_flight.clear();
        self.stale_before = MutationId(self.next_id);
    }

    /// The cart as it should be displayed right now.
    pub fn snapshot(&self) -> Cart {
        Cart::from_lines(
            self.owner,
            self.visible_lines().into_iter().cloned().collect(),
        )
    }

    /// Totals of [`Reconciler::snapshot`].
    ///
    /// # Errors
    ///
    /// See [`Cart::totals`].
    pub fn totals<'a, C>(
        &self,
        catalog: &C,
        currency: &'a Currency,
    ) -> Result<CartTotals<'a>, CartError>
    where
        C: Catalog<'a> + ?Sized,
    {
        self.snapshot().totals(catalog, currency)
    }

    fn visible(&self, line: CartLineUuid) -> Result<CartLineItem, CartError> {
        self.line(line).cloned().ok_or(CartError::NotFound(line))
    }

    fn visible_lines(&self) -> Vec<&CartLineItem> {
        let optimistic_only = self
            .overlays
            .keys()
            .filter(|uuid| !self.confirmed.contains_key(*uuid));

        let mut lines: Vec<&CartLineItem> = self
            .confirmed
            .keys()
            .chain(optimistic_only)
            .filter_map(|uuid| self.line(*uuid))
            .collect();

        lines.sort_by_key(|line| line.uuid);

        lines
    }

    fn issue(
        &mut self,
        line: CartLineUuid,
        state: Option<CartLineItem>,
        kind: MutationKind,
    ) -> PendingMutation {
        self.next_id += 1;

        let id = MutationId(self.next_id);

        self.overlays.insert(line, Overlay { state, latest: id });
        *self.in_flight.entry(line).or_default() += 1;

        PendingMutation { id, line, kind }
    }

    fn is_stale(&self, id: MutationId, line: CartLineUuid) -> bool {
        id <= self.stale_before || self.applied.get(&line).is_some_and(|applied| *applied >= id)
    }

    // Responses from before the last resync were already dropped from the count.
    fn settle(&mut self, id: MutationId, line: CartLineUuid) {
        if id <= self.stale_before {
            return;
        }

        if let Some(count) = self.in_flight.get_mut(&line) {
            *count -= 1;

            if *count == 0 {
                self.in_flight.remove(&line);
            }
        }
    }

    // A deleted line with nothing pending can no longer receive a response
    // that needs the ordering watermark.
    fn forget_if_gone(&mut self, line: CartLineUuid) {
        if !self.confirmed.contains_key(&line)
            && !self.overlays.contains_key(&line)
            && !self.in_flight.contains_key(&line)
        {
            self.applied.remove(&line);
        }
    }
}

fn confirmed_lines(cart: &Cart) -> BTreeMap<CartLineUuid, CartLineItem> {
    cart.lines()
        .iter()
        .map(|line| (line.uuid, line.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::VND};
    use testresult::TestResult;

    use crate::{catalog::ProductCatalog, discounts::Discount};

    use super::*;

    fn pho() -> Result<Product<'static>, crate::products::ProductError> {
        Product::new(
            ProductUuid::new(),
            "Pho",
            Money::from_minor(50_000, VND),
            Discount::NONE,
            10,
        )
    }

    fn seeded(product: &Product<'_>) -> Result<(Cart, CartLineUuid), CartError> {
        let mut cart = Cart::new(UserUuid::new());
        let line = cart.add(CartLineUuid::new(), product)?.line();

        Ok((cart, line))
    }

    fn quantity_of(reconciler: &Reconciler, line: CartLineUuid) -> Option<u32> {
        reconciler.line(line).map(|item| item.quantity.get())
    }

    #[test]
    fn increment_is_visible_before_confirmation() -> TestResult {
        let product = pho()?;
        let (cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        reconciler.increment(line)?;

        assert_eq!(quantity_of(&reconciler, line), Some(2));
        assert!(!reconciler.is_settled());

        Ok(())
    }

    #[test]
    fn confirmation_settles_overlay() -> TestResult {
        let product = pho()?;
        let (mut cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let pending = reconciler.increment(line)?;
        let server = cart.increment(line)?.clone();

        assert_eq!(
            reconciler.confirm(pending.id, line, Some(server)),
            Reconciliation::Applied
        );
        assert!(reconciler.is_settled());
        assert_eq!(reconciler.snapshot(), cart);

        Ok(())
    }

    #[test]
    fn late_response_does_not_overwrite_newer_one() -> TestResult {
        let product = pho()?;
        let (mut cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let first = reconciler.increment(line)?;
        let first_server = cart.increment(line)?.clone();
        let second = reconciler.increment(line)?;
        let second_server = cart.increment(line)?.clone();

        assert_eq!(
            reconciler.confirm(second.id, line, Some(second_server)),
            Reconciliation::Applied
        );
        assert_eq!(
            reconciler.confirm(first.id, line, Some(first_server)),
            Reconciliation::Stale
        );
        assert_eq!(quantity_of(&reconciler, line), Some(3));

        Ok(())
    }

    #[test]
    fn older_confirmation_keeps_newer_optimistic_state() -> TestResult {
        let product = pho()?;
        let (mut cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let first = reconciler.increment(line)?;
        reconciler.increment(line)?;
        let first_server = cart.increment(line)?.clone();

        reconciler.confirm(first.id, line, Some(first_server));

        assert_eq!(quantity_of(&reconciler, line), Some(3));
        assert_eq!(reconciler.pending(), 1);

        Ok(())
    }

    #[test]
    fn decrement_from_one_hides_line() -> TestResult {
        let product = pho()?;
        let (cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let pending = reconciler.decrement(line)?;

        assert_eq!(pending.kind, MutationKind::Decrement);
        assert!(reconciler.line(line).is_none());
        assert!(reconciler.snapshot().is_empty());

        Ok(())
    }

    #[test]
    fn rejected_mutation_reverts() -> TestResult {
        let product = pho()?;
        let (cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let pending = reconciler.remove(line)?;

        assert_eq!(reconciler.reject(pending.id, line), Reconciliation::Applied);
        assert_eq!(quantity_of(&reconciler, line), Some(1));

        Ok(())
    }

    #[test]
    fn rejecting_older_mutation_keeps_newer_optimistic_state() -> TestResult {
        let product = pho()?;
        let (mut cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let first = reconciler.increment(line)?;
        let second = reconciler.increment(line)?;

        assert_eq!(reconciler.reject(first.id, line), Reconciliation::Stale);
        assert_eq!(quantity_of(&reconciler, line), Some(3));

        let server = cart.increment(line)?.clone();

        assert_eq!(
            reconciler.confirm(second.id, line, Some(server)),
            Reconciliation::Applied
        );
        assert_eq!(quantity_of(&reconciler, line), Some(2));
        assert!(reconciler.is_settled());

        Ok(())
    }

    #[test]
    fn reject_after_resync_is_stale() -> TestResult {
        let product = pho()?;
        let (cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let pending = reconciler.remove(line)?;

        reconciler.resync(&cart);

        assert_eq!(reconciler.reject(pending.id, line), Reconciliation::Stale);
        assert_eq!(quantity_of(&reconciler, line), Some(1));

        Ok(())
    }

    #[test]
    fn confirmed_deletion_forgets_line() -> TestResult {
        let product = pho()?;
        let (cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let pending = reconciler.remove(line)?;

        assert_eq!(
            reconciler.confirm(pending.id, line, None),
            Reconciliation::Applied
        );
        assert!(!reconciler.applied.contains_key(&line));
        assert!(reconciler.in_flight.is_empty());

        Ok(())
    }

    #[test]
    fn deleted_line_ignores_late_older_response() -> TestResult {
        let product = pho()?;
        let (mut cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let first = reconciler.increment(line)?;
        let first_server = cart.increment(line)?.clone();
        let second = reconciler.remove(line)?;

        assert_eq!(
            reconciler.confirm(second.id, line, None),
            Reconciliation::Applied
        );
        assert!(reconciler.applied.contains_key(&line));

        assert_eq!(
            reconciler.confirm(first.id, line, Some(first_server)),
            Reconciliation::Stale
        );
        assert!(reconciler.line(line).is_none());
        assert!(reconciler.applied.is_empty());

        Ok(())
    }

    #[test]
    fn add_of_present_product_issues_nothing() -> TestResult {
        let product = pho()?;
        let (cart, _) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        assert_eq!(reconciler.add(&product)?, None);
        assert!(reconciler.is_settled());

        Ok(())
    }

    #[test]
    fn add_then_confirm_uses_client_line_uuid() -> TestResult {
        let product = pho()?;
        let mut cart = Cart::new(UserUuid::new());
        let mut reconciler = Reconciler::from_cart(&cart);

        let pending = reconciler.add(&product)?.ok_or("expected a mutation")?;
        cart.add(pending.line, &product)?;

        reconciler.confirm(pending.id, pending.line, cart.line(pending.line).cloned());

        assert_eq!(reconciler.snapshot(), cart);

        Ok(())
    }

    #[test]
    fn responses_issued_before_resync_are_stale() -> TestResult {
        let product = pho()?;
        let (mut cart, line) = seeded(&product)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        let pending = reconciler.increment(line)?;
        let server = cart.increment(line)?.clone();

        reconciler.resync(&cart);

        assert_eq!(
            reconciler.confirm(pending.id, line, Some(server)),
            Reconciliation::Stale
        );
        assert_eq!(reconciler.snapshot(), cart);

        Ok(())
    }

    #[test]
    fn totals_follow_optimistic_view() -> TestResult {
        let product = pho()?;
        let (cart, line) = seeded(&product)?;
        let catalog = ProductCatalog::with_products([product], VND)?;
        let mut reconciler = Reconciler::from_cart(&cart);

        reconciler.increment(line)?;

        let totals = reconciler.totals(&catalog, VND)?;

        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.total_price, Money::from_minor(100_000, VND));

        Ok(())
    }

    #[test]
    fn missing_line_is_not_found() {
        let mut reconciler = Reconciler::new(UserUuid::new());
        let line = CartLineUuid::new();

        assert_eq!(reconciler.increment(line), Err(CartError::NotFound(line)));
    }
}
