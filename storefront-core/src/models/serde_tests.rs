//! Persisted-shape tests.
//!
//! The cart, currency preference and listing cache are written to the
//! key-value store as JSON; these tests pin the shapes so a release does not
//! silently invalidate every shopper's saved cart.

use rust_decimal::Decimal;
use serde_json::json;

use super::*;

#[test]
fn test_cart_snapshot_is_a_bare_array() {
    let mut cart = CartSnapshot::new();
    cart.add(NewCartLine::new(
        ProductRef::new(10, "Shirt", "shirt", Decimal::from(500)),
        2,
    ));

    let value = serde_json::to_value(&cart).unwrap();
    let lines = value.as_array().expect("snapshot serializes as an array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], json!(2));
    assert_eq!(lines[0]["product"]["id"], json!(10));
    assert!(lines[0].get("size").is_none());
}

#[test]
fn test_cart_snapshot_reads_legacy_numeric_price() {
    let raw = json!([{
        "id": "line-1",
        "product": {"id": 3, "name": "Cap", "slug": "cap", "price": 1200},
        "quantity": 1,
        "size": {"id": 2, "label": "M"}
    }]);
    let cart: CartSnapshot = serde_json::from_value(raw).unwrap();
    assert_eq!(cart.total_price(), Decimal::from(1200));
    assert_eq!(cart.lines()[0].size_id(), Some(2));
    assert!(cart.is_well_formed());
}

#[test]
fn test_malformed_cart_is_rejected_by_serde() {
    let raw = json!({"lines": "not-an-array"});
    assert!(serde_json::from_value::<CartSnapshot>(raw).is_err());

    let raw = json!([{"id": "x", "quantity": -1}]);
    assert!(serde_json::from_value::<CartSnapshot>(raw).is_err());
}

#[test]
fn test_currency_code_wire_format() {
    assert_eq!(serde_json::to_value(CurrencyCode::Usd).unwrap(), json!("USD"));
    let code: CurrencyCode = serde_json::from_value(json!("GBP")).unwrap();
    assert_eq!(code, CurrencyCode::Gbp);
}

#[test]
fn test_listing_payload_is_tagged() {
    let payload = ListingPayload::Products(vec![]);
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value, json!({"kind": "products", "items": []}));
}

#[test]
fn test_api_failure_shape() {
    let failure = ApiFailure::new("Not found", 404);
    let value = serde_json::to_value(&failure).unwrap();
    assert_eq!(value, json!({"success": false, "message": "Not found", "status": 404}));

    let network = ApiFailure::network("connection refused");
    let value = serde_json::to_value(&network).unwrap();
    assert!(value.get("status").is_none());
    assert!(network.is_transient());
    assert!(!failure.is_transient());
}

#[test]
fn test_unknown_order_state_deserializes() {
    let state: OrderState = serde_json::from_value(json!("on_hold")).unwrap();
    assert_eq!(state, OrderState::Unknown);
}
