//! Checkout command - hand the cart off to order placement.

use anyhow::Result;
use clap::Args;
use storefront_core::CustomerDetails;
use storefront_store::{CheckoutContext, checkout};

use super::{App, emit};
use crate::Cli;
use crate::output::Pricing;

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Full name.
    #[arg(long)]
    pub name: String,

    /// Email address.
    #[arg(long)]
    pub email: String,

    /// Phone number.
    #[arg(long)]
    pub phone: String,

    /// Delivery address.
    #[arg(long)]
    pub address: String,
}

/// Runs the checkout command.
pub async fn run(args: &CheckoutArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let api = app.api()?;
    let cart = app.cart();
    let currency = app.currency();
    let affiliate = app.affiliate();

    let ctx = CheckoutContext {
        cart: &cart,
        currency: &currency,
        affiliate: &affiliate,
        bus: &app.bus,
    };
    let customer = CustomerDetails {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        address: args.address.clone(),
    };

    let receipt = checkout(api.as_ref(), ctx, customer).await?;
    let pricing = Pricing::from_store(&currency);
    emit(cli, &receipt, |f| f.format_receipt(&receipt, &pricing))
}
