//! Login and logout commands.

use anyhow::{Result, bail};
use clap::Args;
use storefront_core::UserIdentity;

use super::{App, emit};
use crate::Cli;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Bearer token issued by the storefront.
    #[arg(long)]
    pub token: String,

    /// User id.
    #[arg(long)]
    pub user_id: Option<u64>,

    /// Display name.
    #[arg(long)]
    pub name: Option<String>,

    /// Email address.
    #[arg(long)]
    pub email: Option<String>,
}

/// Stores a credential.
pub async fn login(args: &LoginArgs, cli: &Cli) -> Result<()> {
    if args.token.trim().is_empty() {
        bail!("Token cannot be empty");
    }

    let app = App::load().await?;
    let user = match (args.user_id, &args.name, &args.email) {
        (Some(id), Some(name), Some(email)) => Some(UserIdentity {
            id,
            name: name.clone(),
            email: email.clone(),
        }),
        (None, None, None) => None,
        _ => bail!("--user-id, --name and --email must be given together"),
    };
    app.session.sign_in(args.token.as_str(), user);

    let user = app.session.user();
    emit(cli, &serde_json::json!({ "signedIn": true, "user": user }), |_| match &user {
        Some(u) => format!("Signed in as {} <{}>", u.name, u.email),
        None => "Credential stored".to_string(),
    })
}

/// Forgets the stored credential.
pub async fn logout(cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let was_signed_in = app.session.is_signed_in();
    app.session.sign_out();

    emit(cli, &serde_json::json!({ "signedIn": false }), |_| {
        if was_signed_in {
            "Signed out".to_string()
        } else {
            "No stored credential".to_string()
        }
    })
}
