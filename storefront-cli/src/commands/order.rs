//! Order command - order tracking.

use anyhow::Result;
use clap::{Args, Subcommand};
use storefront_store::track_order;

use super::{App, emit};
use crate::Cli;
use crate::output::Pricing;

/// Arguments for the order command.
#[derive(Args)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub action: OrderAction,
}

/// Order subcommands.
#[derive(Subcommand)]
pub enum OrderAction {
    /// Show an order's status.
    Track {
        /// Order reference.
        reference: String,
    },
}

/// Runs the order command.
pub async fn run(args: &OrderArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;

    match &args.action {
        OrderAction::Track { reference } => {
            let status = track_order(app.api()?.as_ref(), reference).await?;
            let pricing = Pricing::from_store(&app.currency());
            emit(cli, &status, |f| f.format_order_status(&status, &pricing))
        }
    }
}
