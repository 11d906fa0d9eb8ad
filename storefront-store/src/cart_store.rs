//! Persistent cart.
//!
//! The cart is the authoritative, write-through copy of the user's line
//! list. Every mutation lands in the key-value store before it returns, so
//! the cart survives restarts and is visible to other contexts sharing the
//! same storage.

use std::sync::Arc;

use storefront_core::{CartSnapshot, CartView, CheckoutLine, NewCartLine};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::kv::{KeyValueStore, keys};
use crate::persistent::{Persisted, PersistentStore};
use crate::signal::{Signal, SignalBus};

impl Persisted for CartSnapshot {
    fn is_well_formed(&self) -> bool {
        CartSnapshot::is_well_formed(self)
    }
}

/// The shopping cart.
#[derive(Debug)]
pub struct CartStore {
    state: PersistentStore<CartSnapshot>,
}

impl CartStore {
    /// Opens the cart persisted in `kv`.
    ///
    /// A malformed snapshot is discarded and the cart starts empty.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let state: PersistentStore<CartSnapshot> = PersistentStore::open(kv, keys::CART);
        debug!(lines = state.read(CartSnapshot::len), "Opened cart");
        Self { state }
    }

    /// Adds an item, merging with an existing line of the same product and
    /// size.
    ///
    /// Returns the affected line id, or `None` for a zero quantity.
    pub fn add(&self, item: NewCartLine) -> Option<String> {
        let product_id = item.product.id;
        let mut line_id = None;
        self.state.update(|cart| {
            line_id = cart.add(item);
            line_id.is_some()
        });

        match &line_id {
            Some(id) => debug!(line_id = %id, product_id, "Added to cart"),
            None => debug!(product_id, "Ignored zero-quantity add"),
        }
        line_id
    }

    /// Sets a line's quantity. Quantities below 1 and unknown ids leave the
    /// cart unchanged.
    pub fn update_quantity(&self, line_id: &str, quantity: u32) -> bool {
        let changed = self
            .state
            .update(|cart| cart.update_quantity(line_id, quantity));
        debug!(line_id, quantity, changed, "Update cart quantity");
        changed
    }

    /// Removes a line. Unknown ids are a no-op.
    pub fn remove(&self, line_id: &str) -> bool {
        let changed = self.state.update(|cart| cart.remove(line_id));
        debug!(line_id, changed, "Remove cart line");
        changed
    }

    /// Empties the cart and erases the persisted snapshot.
    pub fn clear(&self) {
        self.state.reset();
        info!("Cart cleared");
    }

    /// Lines with derived totals.
    pub fn read(&self) -> CartView {
        self.state.read(CartSnapshot::view)
    }

    /// Lines in the shape the order API expects, in line order.
    pub fn export_for_checkout(&self) -> Vec<CheckoutLine> {
        self.state.read(CartSnapshot::checkout_lines)
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.state.read(CartSnapshot::len)
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.state.read(CartSnapshot::is_empty)
    }

    /// Re-reads the persisted snapshot, discarding the in-memory copy.
    pub fn reload(&self) {
        self.state.reload();
    }

    /// Subscribes to cart changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }

    /// Reloads the cart whenever [`Signal::CartChanged`] is broadcast.
    ///
    /// The task ends when the bus is dropped or the handle is aborted.
    pub fn listen(self: &Arc<Self>, bus: &SignalBus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let cart = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Signal::CartChanged) => {
                        debug!("Cart changed elsewhere, reloading");
                        cart.reload();
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Signal listener lagged, reloading cart");
                        cart.reload();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
