//! Currency command - display currency and rates.

use anyhow::{Result, anyhow, bail};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront_core::CurrencyCode;
use tracing::info;

use super::{App, emit};
use crate::Cli;
use crate::output::{JsonFormatter, Pricing};

/// Arguments for the currency command.
#[derive(Args)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    pub action: CurrencyAction,
}

/// Currency subcommands.
#[derive(Subcommand)]
pub enum CurrencyAction {
    /// Show the selection and known rates.
    Show,

    /// Select a display currency.
    Set {
        /// Currency code: NGN, USD, GBP, EUR.
        code: String,
    },

    /// Reload rates from the API.
    Refresh,

    /// Format a base-currency amount in the current selection.
    Format {
        /// Amount in the base currency.
        amount: Decimal,
    },
}

/// Runs the currency command.
pub async fn run(args: &CurrencyArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let store = app.currency();

    match &args.action {
        CurrencyAction::Show => {}
        CurrencyAction::Set { code } => {
            let code: CurrencyCode = code.parse().map_err(|e| {
                anyhow!("{e}. Use one of: {}", supported_codes())
            })?;
            store.set_currency(code);
        }
        CurrencyAction::Refresh => {
            let api = app.api()?;
            if !store.load_rates(api.as_ref()).await {
                bail!("Could not load currency rates; previous rates kept");
            }
            info!(currencies = store.rates().entries().len(), "Rates refreshed");
        }
        CurrencyAction::Format { amount } => {
            let formatted = store.format_price(*amount);
            return emit(cli, &serde_json::json!({ "formatted": formatted }), |_| formatted.clone());
        }
    }

    let rates = store.rates();
    let pricing = Pricing::new(rates.clone(), store.currency());
    let output = JsonFormatter::new(cli.pretty).currency_output(&pricing, &rates);
    emit(cli, &output, |f| f.format_currency(&pricing, &rates))
}

fn supported_codes() -> String {
    CurrencyCode::all()
        .iter()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
