//! Checkout hand-off and order tracking.
//!
//! The cart is turned into an order request and handed to the API, which
//! owns payment. A successful hand-off clears the cart and broadcasts the
//! change so every listening context drops its copy.

use storefront_core::{
    ApiFailure, CommerceApi, CustomerDetails, OrderReceipt, OrderRequest, OrderStatus,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::affiliate_store::AffiliateStore;
use crate::cart_store::CartStore;
use crate::currency_store::CurrencyStore;
use crate::signal::{Signal, SignalBus};

/// Reasons a checkout did not go through.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// A required field is blank.
    #[error("missing customer field: {0}")]
    MissingField(&'static str),

    /// The API rejected the order or could not be reached.
    #[error("order failed: {0}")]
    Api(#[from] ApiFailure),
}

/// Stores involved in a checkout.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutContext<'a> {
    /// Lines to order.
    pub cart: &'a CartStore,
    /// Selected display currency.
    pub currency: &'a CurrencyStore,
    /// Referral to attribute the order to.
    pub affiliate: &'a AffiliateStore,
    /// Where the cart change is announced.
    pub bus: &'a SignalBus,
}

/// Builds the order request for the current cart.
///
/// # Errors
///
/// Returns an error for an empty cart or incomplete customer details.
pub fn build_order(
    ctx: CheckoutContext<'_>,
    customer: CustomerDetails,
) -> Result<OrderRequest, CheckoutError> {
    let items = ctx.cart.export_for_checkout();
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if let Some(field) = customer.missing_field() {
        return Err(CheckoutError::MissingField(field));
    }

    Ok(OrderRequest {
        customer,
        items,
        currency: ctx.currency.currency(),
        referral_code: ctx.affiliate.active_code(),
    })
}

/// Places an order for the current cart.
///
/// On success the cart is cleared and [`Signal::CartChanged`] broadcast.
/// On failure the cart is left as it was.
///
/// # Errors
///
/// Returns an error if the order cannot be built or the API rejects it.
#[instrument(skip_all)]
pub async fn checkout(
    api: &dyn CommerceApi,
    ctx: CheckoutContext<'_>,
    customer: CustomerDetails,
) -> Result<OrderReceipt, CheckoutError> {
    let order = build_order(ctx, customer)?;
    info!(
        items = order.items.len(),
        subtotal = %order.subtotal(),
        currency = %order.currency,
        "Placing order"
    );

    match api.place_order(&order).await {
        Ok(receipt) => {
            ctx.cart.clear();
            ctx.bus.emit(Signal::CartChanged);
            info!(reference = %receipt.reference, "Order placed");
            Ok(receipt)
        }
        Err(e) => {
            warn!(error = %e, "Order was not placed, cart kept");
            Err(e.into())
        }
    }
}

/// Fetches an order's status.
///
/// # Errors
///
/// Returns an error for a blank reference or if the API call fails.
pub async fn track_order(
    api: &dyn CommerceApi,
    reference: &str,
) -> Result<OrderStatus, CheckoutError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(CheckoutError::MissingField("reference"));
    }
    let status = api.fetch_order(reference).await?;
    info!(reference, state = %status.state, "Fetched order status");
    Ok(status)
}
