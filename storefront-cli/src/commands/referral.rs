//! Referral command - affiliate referral codes.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use tracing::warn;

use super::{App, emit};
use crate::Cli;

/// Arguments for the referral command.
#[derive(Args)]
pub struct ReferralArgs {
    #[command(subcommand)]
    pub action: ReferralAction,
}

/// Referral subcommands.
#[derive(Subcommand)]
pub enum ReferralAction {
    /// Capture a referral code and report the visit.
    Capture {
        /// Affiliate code.
        code: String,

        /// Page the visitor landed on.
        #[arg(long, default_value = "/")]
        landing_path: String,
    },

    /// Show the active referral.
    Show,
}

/// Runs the referral command.
pub async fn run(args: &ReferralArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let affiliate = app.affiliate();

    if let ReferralAction::Capture { code, landing_path } = &args.action {
        if storefront_store::affiliate_store::normalize_code(code).is_none() {
            bail!("Invalid referral code: {code}");
        }
        affiliate.capture(code);
        match app.api() {
            Ok(api) => {
                affiliate.report_pending(api.as_ref(), landing_path).await;
            }
            Err(e) => warn!(error = %e, "Referral captured but not reported"),
        }
    }

    let referral = affiliate.active();
    emit(cli, &referral, |f| f.format_referral(referral.as_ref()))
}
