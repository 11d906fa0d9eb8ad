// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Storefront CLI - cart, currency and home listings from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Show the cart in the selected currency
//! storefront cart show
//!
//! # Add two of product 42 in size M
//! storefront cart add 42 --name "Leather Loafer" --price 25000 --qty 2 --size-id 2 --size M
//!
//! # Switch display currency and refresh rates
//! storefront currency set usd
//! storefront currency refresh
//!
//! # Home listings, bypassing the cache
//! storefront home show --refresh
//!
//! # JSON output
//! storefront --format json --pretty cart show
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use storefront_store::{LogLevel, SettingsStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{cart, checkout, config, currency, home, order, product, referral, session};

// ============================================================================
// CLI Definition
// ============================================================================

/// Storefront CLI - persistent cart, currency preference and listing cache.
#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront client core CLI")]
#[command(long_about = r#"
Drives the storefront client state from a terminal.

State (cart, currency, cached listings, session, referral) is persisted
between runs in the configured storage backend.

Examples:
  storefront cart show                 # Cart with totals
  storefront currency set gbp          # Change display currency
  storefront home show --refresh       # Refetch home listings
  storefront --format json cart export # Checkout hand-off shape
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and change the cart.
    #[command(visible_alias = "c")]
    Cart(cart::CartArgs),

    /// Display currency and rates.
    Currency(currency::CurrencyArgs),

    /// Home page listings.
    #[command(visible_alias = "h")]
    Home(home::HomeArgs),

    /// Product pages.
    #[command(visible_alias = "p")]
    Product(product::ProductArgs),

    /// Place an order for the current cart.
    Checkout(checkout::CheckoutArgs),

    /// Order tracking.
    Order(order::OrderArgs),

    /// Affiliate referral codes.
    Referral(referral::ReferralArgs),

    /// Store a bearer credential.
    Login(session::LoginArgs),

    /// Forget the stored credential.
    Logout,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("storefront=debug,info")
    } else {
        EnvFilter::new(format!("storefront={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = SettingsStore::load_default().await.get().await.log_level;
    setup_logging(cli.verbose, cli.quiet, level);

    let result = match &cli.command {
        Commands::Cart(args) => cart::run(args, &cli).await,
        Commands::Currency(args) => currency::run(args, &cli).await,
        Commands::Home(args) => home::run(args, &cli).await,
        Commands::Product(args) => product::run(args, &cli).await,
        Commands::Checkout(args) => checkout::run(args, &cli).await,
        Commands::Order(args) => order::run(args, &cli).await,
        Commands::Referral(args) => referral::run(args, &cli).await,
        Commands::Login(args) => session::login(args, &cli).await,
        Commands::Logout => session::logout(&cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}
