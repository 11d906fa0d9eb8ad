// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Storefront Store
//!
//! Persistent client-side state for the storefront.
//!
//! This crate provides:
//!
//! - **KeyValueStore**: The storage seam, with memory, file and SQLite backends
//! - **PersistentStore**: Write-through state with load-on-open and change notification
//! - **CartStore**: The shopping cart
//! - **CurrencyStore**: Display currency selection and rate table
//! - **ListingCache** / **HomeFeed**: Time-boxed home listings and their refresh
//! - **SessionStore** / **AffiliateStore**: Credential and referral state
//! - **SettingsStore**: User configuration with persistence
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_store::{CartStore, MemoryKvStore, SignalBus};
//!
//! let kv = Arc::new(MemoryKvStore::new());
//! let cart = Arc::new(CartStore::open(kv));
//!
//! // Reload whenever another flow changes the cart
//! let bus = SignalBus::new();
//! let _listener = cart.listen(&bus);
//!
//! cart.add(NewCartLine::new(product, 2));
//! println!("{} items", cart.read().total_quantity);
//! ```

pub mod affiliate_store;
pub mod cart_store;
pub mod checkout;
pub mod currency_store;
pub mod error;
pub mod home_feed;
pub mod kv;
pub mod listing_cache;
pub mod persistence;
pub mod persistent;
pub mod session_store;
pub mod settings_store;
pub mod signal;

pub use affiliate_store::{AffiliateStore, REFERRAL_RETENTION, Referral};
pub use cart_store::CartStore;
pub use checkout::{CheckoutContext, CheckoutError, build_order, checkout, track_order};
pub use currency_store::{CurrencyPreference, CurrencyStore};
pub use error::StoreError;
pub use home_feed::{FeedSource, HomeFeed, HomeFeedResult};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore, SqliteKvStore, keys, open_backend};
pub use listing_cache::{LISTING_TTL, ListingCache, ListingSnapshot};
pub use persistence::{
    default_config_dir, default_data_dir, default_settings_path, load_json, load_json_or_default,
    save_json,
};
pub use persistent::{Persisted, PersistentStore};
pub use session_store::{SessionStore, TokenOverride};
pub use settings_store::{LogLevel, Settings, SettingsStore, StorageBackend};
pub use signal::{Signal, SignalBus};
