//! JSON output formatting.

use anyhow::Result;
use chrono::Duration;
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::{CartView, CurrencyCode, HomeListings, RateTable};
use storefront_store::{FeedSource, HomeFeedResult};

use super::Pricing;

// ============================================================================
// Output Types
// ============================================================================

/// Cart with display prices.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOutput {
    pub currency: CurrencyCode,
    pub lines: Vec<CartLineOutput>,
    pub total_price: Decimal,
    pub total_quantity: u64,
    pub display_total: String,
}

/// One cart line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineOutput {
    pub id: String,
    pub product_id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub display_subtotal: String,
}

/// Currency selection and rates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyOutput {
    pub selected: CurrencyCode,
    pub symbol: String,
    pub rate: Decimal,
    pub rates: RateTable,
}

/// Home listings and where they came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeOutput {
    pub source: FeedSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
    pub listings: HomeListings,
}

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }

    /// Builds the cart output.
    pub fn cart_output(&self, view: &CartView, pricing: &Pricing) -> CartOutput {
        CartOutput {
            currency: pricing.code(),
            lines: view
                .lines
                .iter()
                .map(|line| CartLineOutput {
                    id: line.id.clone(),
                    product_id: line.product.id,
                    name: line.product.name.clone(),
                    size: line.size.as_ref().map(|s| s.label.clone()),
                    color: line.color.as_ref().map(|c| c.label.clone()),
                    quantity: line.quantity,
                    unit_price: line.product.price,
                    subtotal: line.subtotal(),
                    display_subtotal: pricing.price(line.subtotal()),
                })
                .collect(),
            total_price: view.total_price,
            total_quantity: view.total_quantity,
            display_total: pricing.price(view.total_price),
        }
    }

    /// Builds the currency output.
    pub fn currency_output(&self, pricing: &Pricing, rates: &RateTable) -> CurrencyOutput {
        CurrencyOutput {
            selected: pricing.code(),
            symbol: rates.symbol_for(pricing.code()),
            rate: rates.rate_for(pricing.code()),
            rates: rates.clone(),
        }
    }

    /// Builds the home output.
    pub fn home_output(&self, result: &HomeFeedResult, age: Option<Duration>) -> HomeOutput {
        HomeOutput {
            source: result.source,
            age_seconds: age.map(|a| a.num_seconds().max(0)),
            listings: result.listings.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
