//! Config command - settings file, API endpoint and storage location.

use anyhow::Result;
use clap::{Args, Subcommand};
use storefront_store::{SettingsStore, default_config_dir, default_settings_path};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show configuration and data paths.
    Path,

    /// Set the commerce API base URL.
    SetApi {
        /// Absolute http(s) URL.
        url: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli).await,
        ConfigAction::SetApi { url } => set_api(url).await,
        ConfigAction::Reset => reset_config().await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await;
    let settings = store.get().await.with_env_overrides();

    match cli.format {
        OutputFormat::Text => {
            println!("Storefront Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("API base URL:    {}", settings.api_base_url);
            println!("Request timeout: {}s", settings.request_timeout_secs);
            println!("Max retries:     {}", settings.max_retries);
            if settings.allowed_domains.is_empty() {
                println!("Allowed domains: any");
            } else {
                println!("Allowed domains: {}", settings.allowed_domains.join(", "));
            }
            println!("Storage backend: {}", settings.storage_backend);
            println!("Data directory:  {}", settings.resolved_data_dir().display());
            println!("Log level:       {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

async fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let data_dir = SettingsStore::load_default()
        .await
        .get()
        .await
        .with_env_overrides()
        .resolved_data_dir();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Data dir:      {}", data_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "data_dir": data_dir.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_api(url: &str) -> Result<()> {
    let store = SettingsStore::load_default().await;
    store.set_api_base_url(url).await?;
    store.save().await?;

    let settings = store.get().await;
    info!(url = %settings.api_base_url, "API base URL updated");
    println!("API base URL set to: {}", settings.api_base_url);

    Ok(())
}

async fn reset_config() -> Result<()> {
    let path = default_settings_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
