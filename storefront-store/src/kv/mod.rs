//! The persistent key-value seam.
//!
//! Every store writes its full snapshot under one fixed key. Backends are
//! synchronous so that a mutation has been written through by the time the
//! mutating call returns.

mod file;
mod memory;
mod sqlite;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::error::StoreError;
use crate::settings_store::{Settings, StorageBackend};

/// Fixed storage keys.
pub mod keys {
    /// Cart line list.
    pub const CART: &str = "cart";
    /// Currency selection and last known rate table.
    pub const CURRENCY: &str = "currency";
    /// Home listing cache generation.
    pub const HOME_CACHE: &str = "home_cache";
    /// Bearer credential.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Signed-in identity record.
    pub const AUTH_USER: &str = "auth_user";
    /// Captured affiliate referral.
    pub const AFFILIATE_REF: &str = "affiliate_ref";

    /// Every key the stores write.
    pub const ALL: &[&str] = &[CART, CURRENCY, HOME_CACHE, AUTH_TOKEN, AUTH_USER, AFFILIATE_REF];
}

/// String key-value storage shared by every store.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Reads the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Opens the backend selected in settings.
///
/// # Errors
///
/// Returns an error if the data directory or database cannot be opened.
pub fn open_backend(settings: &Settings) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    let dir = settings.resolved_data_dir();
    info!(backend = %settings.storage_backend, dir = %dir.display(), "Opening storage backend");

    let store: Arc<dyn KeyValueStore> = match settings.storage_backend {
        StorageBackend::File => Arc::new(FileKvStore::open(dir.join("kv"))?),
        StorageBackend::Sqlite => Arc::new(SqliteKvStore::open(&dir.join("storefront.db"))?),
    };
    Ok(store)
}
