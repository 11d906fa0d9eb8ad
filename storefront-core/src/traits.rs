//! Trait definitions for the storefront.
//!
//! [`CommerceApi`] is the seam between the stores and the remote commerce
//! service. The HTTP client implements it; tests substitute scripted fakes.

use async_trait::async_trait;

use crate::models::{
    ApiResult, ListingPayload, ListingSlot, OrderReceipt, OrderRequest, OrderStatus, Product,
    RateTable,
};

/// The remote commerce API as seen by the client core.
///
/// Every method maps the response into strict entities before returning;
/// failures come back as [`crate::ApiFailure`] values, never panics.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Fetches the currency rate table.
    async fn fetch_currencies(&self) -> ApiResult<RateTable>;

    /// Fetches the payload for one home-page listing slot.
    async fn fetch_listing(&self, slot: ListingSlot) -> ApiResult<ListingPayload>;

    /// Fetches a product page by slug.
    async fn fetch_product(&self, slug: &str) -> ApiResult<Product>;

    /// Hands a checkout off to the order-placement endpoint.
    async fn place_order(&self, order: &OrderRequest) -> ApiResult<OrderReceipt>;

    /// Fetches tracking information for an order reference.
    async fn fetch_order(&self, reference: &str) -> ApiResult<OrderStatus>;

    /// Reports an affiliate referral visit.
    async fn track_referral(&self, code: &str, landing_path: &str) -> ApiResult<()>;
}
