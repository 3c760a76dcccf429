use std::io;

use clap::Args;
use freshcart::{
    checkout::{Checkout, CheckoutRequest, last_order},
    receipt::write_order,
};

use super::{CliError, Storefront};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Shipping address
    #[arg(long)]
    address: Option<String>,

    /// Payment method
    #[arg(long)]
    payment: Option<String>,
}

pub(crate) async fn run(
    storefront: &Storefront,
    args: CheckoutArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let mut cart = storefront.cart();

    if let Some(address) = args.address {
        cart.set_shipping_address(address);
    }

    if let Some(payment) = args.payment {
        cart.set_payment_method(payment);
    }

    let checkout = Checkout::new(
        storefront.store().clone(),
        storefront.config().checkout_latency(),
    );

    let request = CheckoutRequest::from_cart(&cart);

    writeln!(out, "Placing order...")?;

    let order = checkout.place_order(&mut cart, &request).await?;

    write_order(out, &order, storefront.policy())?;

    Ok(())
}

pub(crate) fn last(storefront: &Storefront, out: &mut impl io::Write) -> Result<(), CliError> {
    match last_order(storefront.store().as_ref()) {
        Some(order) => write_order(out, &order, storefront.policy())?,
        None => writeln!(out, "No orders yet.")?,
    }

    Ok(())
}
