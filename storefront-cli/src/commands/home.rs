//! Home command - cached home page listings.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::sync::Arc;
use storefront_store::HomeFeed;

use super::{App, emit};
use crate::Cli;
use crate::output::{JsonFormatter, Pricing};

/// Arguments for the home command.
#[derive(Args)]
pub struct HomeArgs {
    #[command(subcommand)]
    pub action: HomeAction,
}

/// Home subcommands.
#[derive(Subcommand)]
pub enum HomeAction {
    /// Show the listings, from cache while it is fresh.
    Show {
        /// Bypass the cache.
        #[arg(long)]
        refresh: bool,
    },

    /// Drop the cached listings.
    Invalidate,
}

/// Runs the home command.
pub async fn run(args: &HomeArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let cache = Arc::new(app.listings());

    match &args.action {
        HomeAction::Show { refresh } => {
            let feed = HomeFeed::new(app.api()?, Arc::clone(&cache));
            let result = feed.load(*refresh).await;
            let age = cache.age();
            let pricing = Pricing::from_store(&app.currency());

            let output = JsonFormatter::new(cli.pretty).home_output(&result, age);
            emit(cli, &output, |f| {
                f.format_listings(&result.listings, result.source, age, &pricing)
            })
        }
        HomeAction::Invalidate => {
            cache.invalidate();
            emit(cli, &serde_json::json!({ "invalidated": true }), |_| {
                "Home listings cache cleared".to_string()
            })
        }
    }
}
