// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Storefront Core
//!
//! Core types, models, and traits shared by the storefront crates.
//!
//! This crate provides:
//!
//! - Domain models (cart lines, products, currencies, listings, orders)
//! - Boundary mapping from loosely shaped API JSON into strict entities
//! - Price formatting against a currency rate table
//! - The [`CommerceApi`] trait implemented by the HTTP client
//!
//! ## Key Types
//!
//! ### Cart
//! - [`CartSnapshot`] - Ordered cart lines with merge-on-add semantics
//! - [`CartLine`] - One product + variant selection + quantity
//! - [`CartView`] - Lines plus derived totals
//! - [`CheckoutLine`] - Stable hand-off shape for order placement
//!
//! ### Currency
//! - [`CurrencyCode`] - Closed set of display currencies
//! - [`RateTable`] - Exchange rates relative to the base currency
//!
//! ### Listings
//! - [`ListingSlot`] - Named home-page listing slots
//! - [`ListingPayload`] - Typed payload for one slot

pub mod error;
pub mod models;
pub mod traits;

pub use error::CoreError;

pub use models::{
    // API contract
    ApiFailure,
    ApiResult,
    // Cart
    CartLine,
    CartSnapshot,
    CartView,
    CheckoutLine,
    NewCartLine,
    VariantSelection,
    // Currency
    BASE_CURRENCY,
    CurrencyCode,
    CurrencyRate,
    RateTable,
    format_money,
    // Listings
    HomeListings,
    ListingPayload,
    ListingSlot,
    // Products
    Banner,
    Product,
    ProductRef,
    ProductSummary,
    slugify,
    // Orders & accounts
    CustomerDetails,
    OrderReceipt,
    OrderRequest,
    OrderState,
    OrderStatus,
    UserIdentity,
};

pub use traits::CommerceApi;
