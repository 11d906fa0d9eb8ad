//! Output formatting for CLI.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use rust_decimal::Decimal;
use storefront_core::{CurrencyCode, RateTable};
use storefront_store::CurrencyStore;

/// Renders base-currency amounts in the selected display currency.
#[derive(Debug, Clone)]
pub struct Pricing {
    rates: RateTable,
    code: CurrencyCode,
}

impl Pricing {
    pub fn new(rates: RateTable, code: CurrencyCode) -> Self {
        Self { rates, code }
    }

    pub fn from_store(store: &CurrencyStore) -> Self {
        Self::new(store.rates(), store.currency())
    }

    pub fn code(&self) -> CurrencyCode {
        self.code
    }

    pub fn price(&self, amount: Decimal) -> String {
        self.rates.format_price(amount, self.code)
    }
}

#[cfg(test)]
mod tests;
