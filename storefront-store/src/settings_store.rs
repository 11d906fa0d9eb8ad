//! User settings store.
//!
//! Manages the storefront configuration with persistence and change
//! notification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::StoreError;
use crate::persistence::{default_data_dir, default_settings_path, load_json, save_json};

/// Overrides `api_base_url`.
pub const API_URL_ENV: &str = "STOREFRONT_API_URL";
/// Overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "STOREFRONT_DATA_DIR";
/// Seeds the bearer credential.
pub const TOKEN_ENV: &str = "STOREFRONT_TOKEN";

// ============================================================================
// Settings Types
// ============================================================================

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the commerce API.
    pub api_base_url: String,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Retries for idempotent requests after the first attempt fails.
    pub max_retries: u32,

    /// Hosts the HTTP client may talk to (empty allows all).
    pub allowed_domains: Vec<String>,

    /// Where the key-value state lives.
    pub storage_backend: StorageBackend,

    /// Data directory override.
    pub data_dir: Option<PathBuf>,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/".to_string(),
            request_timeout_secs: 30,
            max_retries: 3,
            allowed_domains: Vec::new(),
            storage_backend: StorageBackend::default(),
            data_dir: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Applies `STOREFRONT_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(url = %url, "API URL overridden from environment");
            self.api_base_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(dir = %dir, "Data directory overridden from environment");
            self.data_dir = Some(PathBuf::from(dir.trim()));
        }
        self
    }

    /// Data directory in effect.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Total attempts for an idempotent request, counting the first.
    pub fn retry_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per key.
    #[default]
    File,
    /// A single SQLite database.
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(StoreError::Config(format!("unknown storage backend: {other}"))),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Thread-safe settings store with change notification.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store holding defaults.
    pub fn new(path: PathBuf) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path, falling back to defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Settings file location.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Validates and sets the API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub async fn set_api_base_url(&self, url: &str) -> Result<(), StoreError> {
        let parsed =
            Url::parse(url.trim()).map_err(|e| StoreError::Config(format!("invalid API URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::Config(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }
        self.update(|s| s.api_base_url = parsed.to_string()).await;
        Ok(())
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://localhost:8080/api/");
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.storage_backend, StorageBackend::File);
    }

    #[test]
    fn test_retry_attempts_count_the_first_try() {
        let mut settings = Settings::default();
        assert_eq!(settings.retry_attempts(), 4);

        settings.max_retries = 0;
        assert_eq!(settings.retry_attempts(), 1);

        settings.max_retries = u32::MAX;
        assert_eq!(settings.retry_attempts(), u32::MAX);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"storage_backend":"sqlite"}"#).unwrap();
        assert_eq!(settings.storage_backend, StorageBackend::Sqlite);
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default().with_overrides(|name| match name {
            API_URL_ENV => Some("https://shop.example.com/api/".to_string()),
            DATA_DIR_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(settings.api_base_url, "https://shop.example.com/api/");
        assert_eq!(settings.data_dir, None);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[tokio::test]
    async fn test_set_api_base_url_validates() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        let mut rx = store.subscribe();

        assert!(store.set_api_base_url("ftp://example.com").await.is_err());
        assert!(store.set_api_base_url("not a url").await.is_err());

        store.set_api_base_url("https://shop.example.com/api/").await.unwrap();
        assert_eq!(store.get().await.api_base_url, "https://shop.example.com/api/");
        assert!(rx.has_changed().unwrap());
    }
}
