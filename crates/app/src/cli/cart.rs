use std::io::Write;

use clap::Args;
use eatease::{
    cart::{AddOutcome, CartLineUuid, UserUuid},
    products::ProductUuid,
    quantity::Quantity,
};
use tabled::builder::Builder;

use crate::domain::carts::{CartsService, models::NewCartItem};

use super::{table, write_failed};

#[derive(Debug, Args)]
pub struct UserArgs {
    /// Shopper UUID
    #[arg(long, env = "EATEASE_USER")]
    pub user: UserUuid,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Product UUID
    #[arg(long)]
    pub product: ProductUuid,

    /// Optional line UUID; generated when omitted
    #[arg(long)]
    pub line: Option<CartLineUuid>,
}

#[derive(Debug, Args)]
pub struct LineArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Cart line UUID
    #[arg(long)]
    pub line: CartLineUuid,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// New quantity, a whole number of at least 1
    #[arg(long)]
    pub quantity: Quantity,
}

pub(super) async fn add(
    carts: &dyn CartsService,
    args: AddArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let item = NewCartItem {
        uuid: args.line.unwrap_or_else(CartLineUuid::new),
        product_uuid: args.product,
    };

    let outcome = carts
        .add_item(args.user.user, item)
        .await
        .map_err(|error| format!("failed to add item: {error}"))?;

    match outcome {
        AddOutcome::Added(line) => writeln!(out, "added line {line}"),
        AddOutcome::AlreadyPresent(line) => {
            writeln!(out, "product is already in the cart as line {line}")
        }
    }
    .map_err(write_failed)
}

pub(super) async fn increment(
    carts: &dyn CartsService,
    args: LineArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let item = carts
        .increment_item(args.user.user, args.line)
        .await
        .map_err(|error| format!("failed to increment line: {error}"))?;

    writeln!(out, "line {}: quantity {}", item.uuid, item.quantity).map_err(write_failed)
}

pub(super) async fn decrement(
    carts: &dyn CartsService,
    args: LineArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let item = carts
        .decrement_item(args.user.user, args.line)
        .await
        .map_err(|error| format!("failed to decrement line: {error}"))?;

    match item {
        Some(item) => writeln!(out, "line {}: quantity {}", item.uuid, item.quantity),
        None => writeln!(out, "removed line {}", args.line),
    }
    .map_err(write_failed)
}

pub(super) async fn set(
    carts: &dyn CartsService,
    args: SetArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let item = carts
        .set_item_quantity(args.line.user.user, args.line.line, args.quantity)
        .await
        .map_err(|error| format!("failed to set quantity: {error}"))?;

    writeln!(out, "line {}: quantity {}", item.uuid, item.quantity).map_err(write_failed)
}

pub(super) async fn remove(
    carts: &dyn CartsService,
    args: LineArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let item = carts
        .remove_item(args.user.user, args.line)
        .await
        .map_err(|error| format!("failed to remove line: {error}"))?;

    writeln!(out, "removed line {}", item.uuid).map_err(write_failed)
}

pub(super) async fn clear(
    carts: &dyn CartsService,
    args: UserArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    carts
        .clear_cart(args.user)
        .await
        .map_err(|error| format!("failed to clear cart: {error}"))?;

    writeln!(out, "cart cleared").map_err(write_failed)
}

pub(super) async fn show(
    carts: &dyn CartsService,
    args: UserArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let summary = carts
        .summary(args.user)
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    if summary.lines.is_empty() {
        return writeln!(out, "cart is empty").map_err(write_failed);
    }

    let mut builder = Builder::default();

    builder.push_record([
        "Line",
        "Item",
        "Qty",
        "Base Price",
        "Discount",
        "Unit Price",
        "Total",
    ]);

    for line in &summary.lines {
        builder.push_record([
            line.line.uuid.to_string(),
            line.name.clone(),
            line.line.quantity.to_string(),
            line.base_price.to_string(),
            line.discount.to_string(),
            line.unit_price.to_string(),
            line.total.to_string(),
        ]);
    }

    let totals = &summary.totals;

    writeln!(out, "{}", table::render(builder, 2)).map_err(write_failed)?;
    writeln!(out, "Items:    {}", totals.total_quantity).map_err(write_failed)?;
    writeln!(out, "Subtotal: {}", totals.subtotal).map_err(write_failed)?;
    writeln!(out, "Savings:  {}", totals.savings).map_err(write_failed)?;
    writeln!(out, "Total:    {}", totals.total_price).map_err(write_failed)
}
