//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod currency;
pub mod home;
pub mod order;
pub mod product;
pub mod referral;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use storefront_core::CommerceApi;
use storefront_fetch::{CommerceClient, HttpClient, RetryStrategy, SessionVault};
use storefront_store::settings_store::TOKEN_ENV;
use storefront_store::{
    AffiliateStore, CartStore, CurrencyStore, KeyValueStore, ListingCache, SessionStore, Settings,
    SettingsStore, SignalBus, TokenOverride, open_backend,
};
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Everything a command needs: settings, storage and the API client.
pub struct App {
    pub settings: Settings,
    pub kv: Arc<dyn KeyValueStore>,
    pub session: Arc<SessionStore>,
    pub bus: SignalBus,
}

impl App {
    /// Loads settings (with environment overrides) and opens storage.
    pub async fn load() -> Result<Self> {
        let settings = SettingsStore::load_default().await.get().await.with_env_overrides();
        let kv = open_backend(&settings).context("failed to open storage")?;
        let session = Arc::new(SessionStore::open(Arc::clone(&kv)));

        Ok(Self {
            settings,
            kv,
            session,
            bus: SignalBus::new(),
        })
    }

    /// Builds the commerce API client.
    ///
    /// `STOREFRONT_TOKEN` takes precedence over the stored credential and
    /// is never persisted.
    pub fn api(&self) -> Result<Arc<dyn CommerceApi>> {
        let vault: Arc<dyn SessionVault> = match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => {
                debug!("Using bearer credential from environment");
                Arc::new(TokenOverride::new(token, Arc::clone(&self.session)))
            }
            _ => self.session.clone(),
        };

        let mut http =
            HttpClient::with_timeout(Duration::from_secs(self.settings.request_timeout_secs))?;
        if !self.settings.allowed_domains.is_empty() {
            http = http.with_allowed_domains(self.settings.allowed_domains.clone());
        }
        let client = CommerceClient::new(&self.settings.api_base_url, vault)?
            .with_http_client(http)
            .with_retry_strategy(RetryStrategy::new(self.settings.retry_attempts()));

        Ok(Arc::new(client))
    }

    pub fn cart(&self) -> CartStore {
        CartStore::open(Arc::clone(&self.kv))
    }

    pub fn currency(&self) -> CurrencyStore {
        CurrencyStore::open(Arc::clone(&self.kv))
    }

    pub fn listings(&self) -> ListingCache {
        ListingCache::open(Arc::clone(&self.kv))
    }

    pub fn affiliate(&self) -> AffiliateStore {
        AffiliateStore::open(Arc::clone(&self.kv))
    }
}

/// Prints a serializable value as JSON, or `text` otherwise.
pub fn emit<T: serde::Serialize>(cli: &Cli, value: &T, text: impl FnOnce(&TextFormatter) -> String) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", text(&formatter));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(value)?);
        }
    }
    Ok(())
}
