//! Domain models for the storefront.
//!
//! ## Submodules
//!
//! - [`cart`] - Cart lines and the merge-on-add snapshot
//! - [`currency`] - Currency codes, rate tables, formatting
//! - [`listing`] - Home-page listing slots
//! - [`product`] - Products and banners
//! - [`order`] - Checkout, tracking and identity
//! - [`api`] - The API failure contract

mod api;
mod cart;
mod currency;
mod listing;
mod order;
mod product;
pub mod raw;

pub use api::{ApiFailure, ApiResult};
pub use cart::{CartLine, CartSnapshot, CartView, CheckoutLine, NewCartLine, VariantSelection};
pub use currency::{BASE_CURRENCY, CurrencyCode, CurrencyRate, RateTable, format_money};
pub use listing::{HomeListings, ListingPayload, ListingSlot};
pub use order::{
    CustomerDetails, OrderReceipt, OrderRequest, OrderState, OrderStatus, UserIdentity,
};
pub use product::{Banner, Product, ProductRef, ProductSummary, slugify};
#[cfg(test)]
mod serde_tests;
