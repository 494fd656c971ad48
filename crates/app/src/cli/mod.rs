//! Command line front end

use std::{io, sync::Arc};

use clap::Subcommand;

use crate::domain::{carts::CartsService, products::ProductsRepository};

mod cart;
mod products;
mod table;

pub use cart::{AddArgs, LineArgs, SetArgs, UserArgs};

/// Services a command runs against.
#[derive(Clone)]
pub struct CliContext {
    pub products: Arc<dyn ProductsRepository>,
    pub carts: Arc<dyn CartsService>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the product catalog
    Products,

    /// Add a product to a cart
    Add(AddArgs),

    /// Add one unit to a cart line
    Increment(LineArgs),

    /// Remove one unit from a cart line; the line is deleted at zero
    Decrement(LineArgs),

    /// Set the quantity of a cart line
    Set(SetArgs),

    /// Delete a cart line
    Remove(LineArgs),

    /// Show a cart with prices and totals
    Show(UserArgs),

    /// Empty a cart
    Clear(UserArgs),
}

impl Command {
    /// Run the command, writing its output to `out`.
    ///
    /// # Errors
    ///
    /// Returns a printable message when the command fails.
    pub async fn run(self, context: &CliContext, out: &mut impl io::Write) -> Result<(), String> {
        let carts = context.carts.as_ref();

        match self {
            Self::Products => products::list(context.products.as_ref(), out).await,
            Self::Add(args) => cart::add(carts, args, out).await,
            Self::Increment(args) => cart::increment(carts, args, out).await,
            Self::Decrement(args) => cart::decrement(carts, args, out).await,
            Self::Set(args) => cart::set(carts, args, out).await,
            Self::Remove(args) => cart::remove(carts, args, out).await,
            Self::Show(args) => cart::show(carts, args, out).await,
            Self::Clear(args) => cart::clear(carts, args, out).await,
        }
    }
}

fn write_failed(error: io::Error) -> String {
    format!("failed to write output: {error}")
}
