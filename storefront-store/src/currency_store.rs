//! Currency preference and conversion rates.
//!
//! Prices are always stored in the base currency. The selection only
//! changes how amounts are displayed: `amount / rate`, prefixed with the
//! selection's symbol.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{CommerceApi, CurrencyCode, RateTable};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::kv::{KeyValueStore, keys};
use crate::persistent::{Persisted, PersistentStore};

/// Persisted currency state: the selection and the last known rates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyPreference {
    /// Selected display currency.
    pub code: CurrencyCode,
    /// Last rate table received from the API.
    pub rates: RateTable,
}

impl Persisted for CurrencyPreference {
    fn is_well_formed(&self) -> bool {
        self.rates.is_well_formed()
    }
}

/// The display currency selection.
#[derive(Debug)]
pub struct CurrencyStore {
    state: PersistentStore<CurrencyPreference>,
}

impl CurrencyStore {
    /// Opens the preference persisted in `kv`, defaulting to the base
    /// currency.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: PersistentStore::open(kv, keys::CURRENCY),
        }
    }

    /// Current selection.
    pub fn currency(&self) -> CurrencyCode {
        self.state.read(|p| p.code)
    }

    /// Selects a display currency and persists it immediately.
    ///
    /// Codes absent from the rate table are accepted and display
    /// unconverted until rates for them arrive.
    pub fn set_currency(&self, code: CurrencyCode) {
        let changed = self.state.update(|p| {
            if p.code == code {
                return false;
            }
            p.code = code;
            true
        });
        if changed {
            info!(currency = %code, "Currency changed");
        }
        if self.state.read(|p| p.rates.find(code).is_none() && !code.is_base()) {
            debug!(currency = %code, "No rate loaded for selection, displaying unconverted");
        }
    }

    /// Current rate table.
    pub fn rates(&self) -> RateTable {
        self.state.read(|p| p.rates.clone())
    }

    /// Replaces the rate table wholesale.
    pub fn replace_rates(&self, rates: RateTable) {
        self.state.update(|p| {
            if p.rates == rates {
                return false;
            }
            p.rates = rates;
            true
        });
    }

    /// Fetches the rate table from the API.
    ///
    /// On failure the previous table stays in place. Returns whether the
    /// table was refreshed.
    pub async fn load_rates(&self, api: &dyn CommerceApi) -> bool {
        match api.fetch_currencies().await {
            Ok(rates) => {
                info!(currencies = rates.entries().len(), "Loaded currency rates");
                self.replace_rates(rates);
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to load currency rates, keeping previous table");
                false
            }
        }
    }

    /// Formats a base-currency amount in the current selection.
    pub fn format_price(&self, amount: Decimal) -> String {
        self.state.read(|p| p.rates.format_price(amount, p.code))
    }

    /// Symbol of the current selection.
    pub fn symbol(&self) -> String {
        self.state.read(|p| p.rates.symbol_for(p.code))
    }

    /// Conversion rate of the current selection.
    pub fn rate(&self) -> Decimal {
        self.state.read(|p| p.rates.rate_for(p.code))
    }

    /// Re-reads the persisted preference.
    pub fn reload(&self) {
        self.state.reload();
    }

    /// Subscribes to selection and rate changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use storefront_core::CurrencyRate;

    fn table() -> RateTable {
        RateTable::new(vec![
            CurrencyRate::new(CurrencyCode::Ngn, "₦", Decimal::ONE).as_default(),
            CurrencyRate::new(CurrencyCode::Usd, "$", Decimal::new(1500, 0)),
        ])
    }

    #[test]
    fn test_defaults_to_base() {
        let store = CurrencyStore::open(Arc::new(MemoryKvStore::new()));
        assert_eq!(store.currency(), CurrencyCode::Ngn);
        assert_eq!(store.rate(), Decimal::ONE);
        assert_eq!(store.format_price(Decimal::new(1_234_567, 0)), "₦1,234,567.00");
    }

    #[test]
    fn test_selection_survives_reopen() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let store = CurrencyStore::open(kv.clone());
        store.replace_rates(table());
        store.set_currency(CurrencyCode::Usd);

        let reopened = CurrencyStore::open(kv);
        assert_eq!(reopened.currency(), CurrencyCode::Usd);
        assert_eq!(reopened.symbol(), "$");
        assert_eq!(reopened.format_price(Decimal::new(150_000, 0)), "$100.00");
    }

    #[test]
    fn test_unlisted_code_displays_unconverted() {
        let store = CurrencyStore::open(Arc::new(MemoryKvStore::new()));
        store.replace_rates(table());
        store.set_currency(CurrencyCode::Gbp);

        assert_eq!(store.currency(), CurrencyCode::Gbp);
        assert_eq!(store.format_price(Decimal::new(5000, 0)), "₦5,000.00");
    }

    #[test]
    fn test_malformed_preference_defaults() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(keys::CURRENCY, r#"{"code":"XYZ"}"#).unwrap();

        let store = CurrencyStore::open(kv);
        assert_eq!(store.currency(), CurrencyCode::Ngn);
    }

    #[test]
    fn test_reload_picks_up_other_writer() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let first = CurrencyStore::open(kv.clone());
        let second = CurrencyStore::open(kv);
        let rx = first.subscribe();

        second.replace_rates(table());
        second.set_currency(CurrencyCode::Usd);
        assert_eq!(first.currency(), CurrencyCode::Ngn);

        first.reload();
        assert_eq!(first.currency(), CurrencyCode::Usd);
        assert_eq!(first.symbol(), "$");
        assert!(rx.has_changed().unwrap());
    }
}
