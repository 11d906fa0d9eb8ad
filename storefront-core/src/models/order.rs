//! Checkout hand-off, order tracking, and account identity types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::cart::CheckoutLine;
use super::currency::CurrencyCode;
use super::raw::{as_object, opt_decimal, opt_str, opt_u64, req_str, unwrap_envelope};
use crate::error::CoreError;

// ============================================================================
// Order Placement
// ============================================================================

/// Shipping and contact details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Delivery address.
    pub address: String,
}

impl CustomerDetails {
    /// Returns the first missing required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// The body posted to the order-placement endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Who is ordering.
    pub customer: CustomerDetails,
    /// Cart lines in cart order.
    pub items: Vec<CheckoutLine>,
    /// Currency the shopper was browsing in.
    pub currency: CurrencyCode,
    /// Affiliate referral code to credit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

impl OrderRequest {
    /// Sum of line subtotals in the base currency.
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum()
    }
}

/// What the API returns after accepting an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Order reference used for tracking.
    pub reference: String,
    /// Order total in the base currency, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    /// Hosted payment page to redirect the shopper to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

impl OrderReceipt {
    /// Maps a raw order-creation response.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` when no order reference is present.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        let value = unwrap_envelope(value);
        let obj = as_object(&value, "order")?;
        Ok(Self {
            reference: req_str(obj, &["reference", "order_number", "id"])?,
            total: opt_decimal(obj, &["total", "amount"]),
            payment_url: opt_str(obj, &["payment_url", "authorization_url", "checkout_url"]),
        })
    }
}

// ============================================================================
// Order Tracking
// ============================================================================

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Awaiting payment.
    Pending,
    /// Payment confirmed.
    Paid,
    /// Being prepared.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the shopper.
    Delivered,
    /// Cancelled or refunded.
    Cancelled,
    /// A state this client does not know.
    #[serde(other)]
    Unknown,
}

impl OrderState {
    fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "awaiting_payment" => Self::Pending,
            "paid" | "confirmed" => Self::Paid,
            "processing" => Self::Processing,
            "shipped" | "in_transit" => Self::Shipped,
            "delivered" | "completed" => Self::Delivered,
            "cancelled" | "canceled" | "refunded" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Returns true once the order can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Tracking information for a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    /// Order reference.
    pub reference: String,
    /// Current state.
    pub state: OrderState,
    /// Order total in the base currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    /// When the order was placed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<DateTime<Utc>>,
    /// Number of items on the order.
    #[serde(default)]
    pub item_count: u64,
}

impl OrderStatus {
    /// Maps a raw order-tracking response.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` when the reference is missing.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        let value = unwrap_envelope(value);
        let obj = as_object(&value, "order")?;
        let item_count = match obj.get("items") {
            Some(Value::Array(items)) => items.len() as u64,
            _ => opt_u64(obj, &["item_count"]).unwrap_or(0),
        };
        Ok(Self {
            reference: req_str(obj, &["reference", "order_number", "id"])?,
            state: opt_str(obj, &["status", "state"])
                .map_or(OrderState::Unknown, |s| OrderState::parse(&s)),
            total: opt_decimal(obj, &["total", "amount"]),
            placed_at: opt_str(obj, &["created_at", "placed_at"])
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|d| d.with_timezone(&Utc)),
            item_count,
        })
    }
}

// ============================================================================
// Identity
// ============================================================================

/// The signed-in shopper's identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Account id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_receipt_from_response() {
        let receipt = OrderReceipt::from_json(json!({
            "success": true,
            "data": {"order_number": "ORD-1001", "total": 2500, "authorization_url": "https://pay/x"}
        }))
        .unwrap();
        assert_eq!(receipt.reference, "ORD-1001");
        assert_eq!(receipt.total, Some(Decimal::from(2500)));
        assert_eq!(receipt.payment_url.as_deref(), Some("https://pay/x"));
    }

    #[test]
    fn test_status_from_response() {
        let status = OrderStatus::from_json(json!({
            "reference": "ORD-1",
            "status": "In_Transit",
            "created_at": "2026-01-02T03:04:05Z",
            "items": [{}, {}],
        }))
        .unwrap();
        assert_eq!(status.state, OrderState::Shipped);
        assert_eq!(status.item_count, 2);
        assert!(status.placed_at.is_some());
        assert!(!status.state.is_final());
    }

    #[test]
    fn test_missing_customer_field() {
        let customer = CustomerDetails {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: " ".to_string(),
            address: "1 Marina".to_string(),
        };
        assert_eq!(customer.missing_field(), Some("phone"));
    }
}
