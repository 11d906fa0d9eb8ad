//! Write-through persisted state.
//!
//! [`PersistentStore`] keeps one value in memory and mirrors it under a
//! single key of a [`KeyValueStore`]. The value is loaded once on open,
//! every changing mutation writes the full value back before returning,
//! and subscribers are told about each change through a version counter.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::kv::KeyValueStore;

/// A value that can be held by a [`PersistentStore`].
pub trait Persisted: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Whether a decoded value satisfies its own invariants.
    ///
    /// Values that decode but fail this check are treated as malformed.
    fn is_well_formed(&self) -> bool {
        true
    }
}

impl<T> Persisted for Option<T> where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// In-memory state mirrored to a key-value store.
#[derive(Debug)]
pub struct PersistentStore<T> {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    value: RwLock<T>,
    notify: watch::Sender<u64>,
}

impl<T: Persisted> PersistentStore<T> {
    /// Opens the store, loading whatever is persisted under `key`.
    ///
    /// Absent, unreadable or malformed data yields `T::default()`.
    pub fn open(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let value = load(kv.as_ref(), &key);
        let (notify, _) = watch::channel(0);
        Self {
            kv,
            key,
            value: RwLock::new(value),
            notify,
        }
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.value.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Reads the current value without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&value)
    }

    /// Mutates the value in place.
    ///
    /// `f` reports whether it changed anything; only then is the value
    /// written through and subscribers notified. The write lock is held
    /// across the write, so concurrent mutations are serialized.
    pub fn update(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = {
            let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);
            let changed = f(&mut value);
            if changed {
                self.persist(&value);
            }
            changed
        };
        if changed {
            self.notify_change();
        }
        changed
    }

    /// Replaces the value wholesale and writes it through.
    pub fn replace(&self, value: T) {
        self.update(move |current| {
            *current = value;
            true
        });
    }

    /// Re-reads the persisted value, overwriting memory.
    ///
    /// Whatever was written last wins.
    pub fn reload(&self) {
        let loaded = load(self.kv.as_ref(), &self.key);
        {
            let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);
            *value = loaded;
        }
        debug!(key = %self.key, "Reloaded persisted state");
        self.notify_change();
    }

    /// Restores the default value and erases the key.
    pub fn reset(&self) {
        {
            let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);
            *value = T::default();
            if let Err(e) = self.kv.remove(&self.key) {
                warn!(key = %self.key, error = %e, "Failed to erase persisted state");
            }
        }
        self.notify_change();
    }

    /// Subscribes to changes. The received value is a change counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn persist(&self, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to serialize state");
                return;
            }
        };
        if let Err(e) = self.kv.set(&self.key, &json) {
            warn!(key = %self.key, error = %e, "Failed to persist state, keeping it in memory");
        }
    }

    fn notify_change(&self) {
        self.notify.send_modify(|version| *version = version.wrapping_add(1));
    }
}

fn load<T: Persisted>(kv: &dyn KeyValueStore, key: &str) -> T {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted state, using defaults");
            return T::default();
        }
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) if value.is_well_formed() => value,
        Ok(_) => {
            warn!(key, "Persisted state violates its invariants, discarding");
            T::default()
        }
        Err(e) => {
            warn!(key, error = %e, "Malformed persisted state, discarding");
            T::default()
        }
    }
}
