//! Currency selection, rate tables, and price formatting.
//!
//! All prices are stored in [`BASE_CURRENCY`]. Display conversion divides
//! by the selected currency's rate from the [`RateTable`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::raw::{array_items, as_object, opt_bool, opt_str, req_decimal, req_str};
use crate::error::CoreError;

/// The currency every price is stored in.
pub const BASE_CURRENCY: CurrencyCode = CurrencyCode::Ngn;

/// Decimal places shown for every supported currency.
const DISPLAY_DECIMALS: u32 = 2;

// ============================================================================
// Currency Code
// ============================================================================

/// The closed set of currencies a shopper can display prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// Nigerian naira (base currency).
    #[default]
    Ngn,
    /// US dollar.
    Usd,
    /// Pound sterling.
    Gbp,
    /// Euro.
    Eur,
}

impl CurrencyCode {
    /// All supported currencies.
    pub fn all() -> &'static [CurrencyCode] {
        &[
            CurrencyCode::Ngn,
            CurrencyCode::Usd,
            CurrencyCode::Gbp,
            CurrencyCode::Eur,
        ]
    }

    /// ISO 4217 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ngn => "NGN",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
        }
    }

    /// Symbol used when the rate table does not supply one.
    pub fn builtin_symbol(&self) -> &'static str {
        match self {
            Self::Ngn => "₦",
            Self::Usd => "$",
            Self::Gbp => "£",
            Self::Eur => "€",
        }
    }

    /// Returns true for the base currency.
    pub fn is_base(&self) -> bool {
        *self == BASE_CURRENCY
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownCurrency(wanted.to_string()))
    }
}

// ============================================================================
// Rate Table
// ============================================================================

/// One entry of the exchange-rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// Currency code.
    pub code: CurrencyCode,
    /// Display symbol.
    pub symbol: String,
    /// Units of base currency per one unit of this currency.
    pub rate: Decimal,
    /// Whether this is the platform default.
    #[serde(default)]
    pub is_default: bool,
}

impl CurrencyRate {
    /// Creates a rate entry.
    pub fn new(code: CurrencyCode, symbol: impl Into<String>, rate: Decimal) -> Self {
        Self {
            code,
            symbol: symbol.into(),
            rate,
            is_default: false,
        }
    }

    /// Marks this entry as the default.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Maps one raw API currency record.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` for unsupported codes or missing rates.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let obj = as_object(value, "currency")?;
        let code: CurrencyCode = req_str(obj, &["code", "currency"])?.parse()?;
        Ok(Self {
            code,
            symbol: opt_str(obj, &["symbol", "sign"])
                .unwrap_or_else(|| code.builtin_symbol().to_string()),
            rate: req_decimal(obj, &["rate", "exchange_rate", "value"])?,
            is_default: opt_bool(obj, &["is_default", "default"]).unwrap_or(false),
        })
    }

    /// Rate used for conversion; zero or negative rates mean "no conversion".
    pub fn effective_rate(&self) -> Decimal {
        if self.rate > Decimal::ZERO {
            self.rate
        } else {
            Decimal::ONE
        }
    }
}

/// The set of known currencies and their conversion rates.
///
/// Exactly one entry is marked default once constructed through
/// [`RateTable::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    entries: Vec<CurrencyRate>,
}

impl RateTable {
    /// Builds a table, normalizing the default flag.
    ///
    /// Duplicate codes keep their first entry. If no entry is flagged
    /// default, the base currency entry (or else the first entry) becomes
    /// the default; if several are flagged, only the first keeps the flag.
    pub fn new(entries: Vec<CurrencyRate>) -> Self {
        let mut deduped: Vec<CurrencyRate> = Vec::with_capacity(entries.len());
        for entry in entries {
            if deduped.iter().all(|e| e.code != entry.code) {
                deduped.push(entry);
            }
        }

        let default_idx = deduped
            .iter()
            .position(|e| e.is_default)
            .or_else(|| deduped.iter().position(|e| e.code.is_base()))
            .unwrap_or(0);
        for (idx, entry) in deduped.iter_mut().enumerate() {
            entry.is_default = idx == default_idx;
        }

        Self { entries: deduped }
    }

    /// Maps a raw API currency list, dropping unsupported rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` only when the payload itself is not an array.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        let entries = array_items(value)?
            .iter()
            .filter_map(|item| match CurrencyRate::from_json(item) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    warn!(error = %e, "Dropping currency record");
                    None
                }
            })
            .collect();
        Ok(Self::new(entries))
    }

    /// Returns true if no rates have been loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries.
    pub fn entries(&self) -> &[CurrencyRate] {
        &self.entries
    }

    /// Finds the entry for a currency.
    pub fn find(&self, code: CurrencyCode) -> Option<&CurrencyRate> {
        self.entries.iter().find(|e| e.code == code)
    }

    /// Returns the default entry.
    pub fn default_entry(&self) -> Option<&CurrencyRate> {
        self.entries.iter().find(|e| e.is_default)
    }

    /// Returns true if the table satisfies the single-default invariant.
    pub fn is_well_formed(&self) -> bool {
        self.is_empty() || self.entries.iter().filter(|e| e.is_default).count() == 1
    }

    /// Display symbol for a selection.
    pub fn symbol_for(&self, selection: CurrencyCode) -> String {
        if selection.is_base() {
            return self.base_symbol();
        }
        match self.find(selection) {
            Some(entry) => entry.symbol.clone(),
            None => self.base_symbol(),
        }
    }

    /// Conversion rate for a selection, 1 when unknown.
    pub fn rate_for(&self, selection: CurrencyCode) -> Decimal {
        if selection.is_base() {
            return Decimal::ONE;
        }
        self.find(selection)
            .map_or(Decimal::ONE, CurrencyRate::effective_rate)
    }

    /// Formats a base-currency amount for display in `selection`.
    ///
    /// A selection missing from the table (including an unloaded table)
    /// is shown unconverted with the base currency symbol.
    pub fn format_price(&self, amount: Decimal, selection: CurrencyCode) -> String {
        let rate = self.rate_for(selection);
        let converted = amount.checked_div(rate).unwrap_or(amount);
        format_money(converted, &self.symbol_for(selection))
    }

    fn base_symbol(&self) -> String {
        self.find(BASE_CURRENCY)
            .map_or_else(|| BASE_CURRENCY.builtin_symbol().to_string(), |e| e.symbol.clone())
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats an amount as `<sign><symbol><grouped integer>.<2 decimals>`.
///
/// Rounds half away from zero and groups thousands with commas.
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    rounded.rescale(DISPLAY_DECIMALS);

    let digits = rounded.to_string();
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!(
        "{}{symbol}{}.{fraction}",
        if negative { "-" } else { "" },
        group_thousands(whole)
    )
}

fn group_thousands(digits: &str) -> String {
    let count = digits.chars().count();
    let mut out = String::with_capacity(count + count / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (count - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn usd_table() -> RateTable {
        RateTable::new(vec![
            CurrencyRate::new(CurrencyCode::Ngn, "₦", Decimal::ONE).as_default(),
            CurrencyRate::new(CurrencyCode::Usd, "$", Decimal::from(1500)),
        ])
    }

    #[test]
    fn test_usd_conversion() {
        let table = RateTable::new(vec![CurrencyRate::new(
            CurrencyCode::Usd,
            "$",
            Decimal::from(1500),
        )]);
        assert_eq!(
            table.format_price(Decimal::from(150_000), CurrencyCode::Usd),
            "$100.00"
        );
    }

    #[test]
    fn test_base_currency_formatting() {
        let table = usd_table();
        assert_eq!(
            table.format_price(Decimal::from(1_234_567), CurrencyCode::Ngn),
            "₦1,234,567.00"
        );
        assert_eq!(
            RateTable::default().format_price(Decimal::new(99_995, 3), CurrencyCode::Ngn),
            "₦100.00"
        );
    }

    #[test]
    fn test_missing_selection_falls_back_to_base() {
        let table = usd_table();
        assert_eq!(
            table.format_price(Decimal::from(3000), CurrencyCode::Gbp),
            "₦3,000.00"
        );
        assert_eq!(
            RateTable::default().format_price(Decimal::from(3000), CurrencyCode::Usd),
            "₦3,000.00"
        );
    }

    #[test]
    fn test_zero_rate_means_no_conversion() {
        let table = RateTable::new(vec![CurrencyRate::new(
            CurrencyCode::Eur,
            "€",
            Decimal::ZERO,
        )]);
        assert_eq!(table.format_price(Decimal::from(250), CurrencyCode::Eur), "€250.00");
    }

    #[test]
    fn test_format_is_stable_across_switches() {
        let table = usd_table();
        let amount = Decimal::from(150_000);
        let before = table.format_price(amount, CurrencyCode::Ngn);
        let _ = table.format_price(amount, CurrencyCode::Usd);
        assert_eq!(table.format_price(amount, CurrencyCode::Ngn), before);
    }

    #[test]
    fn test_format_money_rounding_and_sign() {
        assert_eq!(format_money(Decimal::new(12_345, 3), "$"), "$12.35");
        assert_eq!(format_money(Decimal::new(-1_500_005, 3), "$"), "-$1,500.01");
        assert_eq!(format_money(Decimal::new(-1, 3), "$"), "$0.00");
        assert_eq!(format_money(Decimal::from(999), "£"), "£999.00");
        assert_eq!(format_money(Decimal::from(1000), "£"), "£1,000.00");
    }

    #[test]
    fn test_default_flag_normalization() {
        let none_flagged = RateTable::new(vec![
            CurrencyRate::new(CurrencyCode::Usd, "$", Decimal::from(1500)),
            CurrencyRate::new(CurrencyCode::Ngn, "₦", Decimal::ONE),
        ]);
        assert_eq!(none_flagged.default_entry().map(|e| e.code), Some(CurrencyCode::Ngn));
        assert!(none_flagged.is_well_formed());

        let both_flagged = RateTable::new(vec![
            CurrencyRate::new(CurrencyCode::Usd, "$", Decimal::from(1500)).as_default(),
            CurrencyRate::new(CurrencyCode::Ngn, "₦", Decimal::ONE).as_default(),
        ]);
        assert_eq!(both_flagged.default_entry().map(|e| e.code), Some(CurrencyCode::Usd));
        assert!(both_flagged.is_well_formed());
    }

    #[test]
    fn test_table_from_api_payload() {
        let raw = json!({"data": [
            {"code": "usd", "symbol": "$", "rate": "1500"},
            {"code": "NGN", "rate": 1, "is_default": true},
            {"code": "JPY", "rate": 10},
        ]});
        let table = RateTable::from_json(raw).unwrap();
        assert_eq!(table.entries().len(), 2);
        assert_eq!(table.find(CurrencyCode::Ngn).map(|e| e.symbol.as_str()), Some("₦"));
        assert_eq!(table.rate_for(CurrencyCode::Usd), Decimal::from(1500));
    }

    #[test]
    fn test_currency_code_parsing() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::Usd);
        assert_eq!(" GBP ".parse::<CurrencyCode>().unwrap(), CurrencyCode::Gbp);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
