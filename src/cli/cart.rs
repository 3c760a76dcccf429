use std::io;

use clap::{Args, Subcommand};
use freshcart::{cart::CartStore, products::ProductId, receipt::write_cart};

use super::{CliError, Storefront};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: Option<CartSubcommand>,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart (default)
    Show,

    /// Add one unit of a product
    Add { id: ProductId },

    /// Remove a product
    Remove { id: ProductId },

    /// Set a product's quantity; zero or less removes it
    Set {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Add one more of a product already in the cart
    Inc { id: ProductId },

    /// Take one of a product out of the cart
    Dec { id: ProductId },

    /// Empty the cart
    Clear,
}

pub(crate) fn run(
    storefront: &Storefront,
    command: CartCommand,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let mut cart = storefront.cart();

    match command.command.unwrap_or(CartSubcommand::Show) {
        CartSubcommand::Show => {}
        CartSubcommand::Add { id } => {
            let product = storefront.product(&id)?;

            cart.add_to_cart(&product);
        }
        CartSubcommand::Remove { id } => {
            if !cart.remove_from_cart(&id) {
                return Err(CliError::NotInCart(id));
            }
        }
        CartSubcommand::Set { id, quantity } => {
            require_line(&cart, &id)?;

            cart.update_quantity(&id, quantity);
        }
        CartSubcommand::Inc { id } => {
            require_line(&cart, &id)?;

            cart.increase_quantity(&id);
        }
        CartSubcommand::Dec { id } => {
            require_line(&cart, &id)?;

            cart.decrease_quantity(&id);
        }
        CartSubcommand::Clear => cart.clear_cart(),
    }

    write_cart(out, &cart.snapshot(), cart.policy())?;

    Ok(())
}

fn require_line(cart: &CartStore, id: &ProductId) -> Result<(), CliError> {
    if cart.line(id).is_none() {
        return Err(CliError::NotInCart(id.clone()));
    }

    Ok(())
}
