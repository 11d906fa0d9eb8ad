//! Cross-context change signals.
//!
//! A flow that mutates persisted state outside a store's own API (checkout,
//! another window) broadcasts a [`Signal`]; stores that listen reload their
//! persisted snapshot in response.

use tokio::sync::broadcast;
use tracing::debug;

const CAPACITY: usize = 64;

/// A named change broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The persisted cart was changed elsewhere.
    CartChanged,
}

impl Signal {
    /// Event name.
    pub fn name(&self) -> &'static str {
        match self {
            Signal::CartChanged => "cartUpdated",
        }
    }
}

/// Broadcast channel for [`Signal`]s.
#[derive(Debug, Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<Signal>,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        Self { tx }
    }

    /// Broadcasts a signal. Returns how many listeners received it.
    pub fn emit(&self, signal: Signal) -> usize {
        let receivers = self.tx.send(signal).unwrap_or(0);
        debug!(signal = signal.name(), receivers, "Broadcast signal");
        receivers
    }

    /// Subscribes to future signals.
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_listeners() {
        let bus = SignalBus::new();
        assert_eq!(bus.emit(Signal::CartChanged), 0);
        assert_eq!(Signal::CartChanged.name(), "cartUpdated");
    }

    #[tokio::test]
    async fn test_listeners_receive_signal() {
        let bus = SignalBus::new();
        let mut rx = bus.subscribe();

        assert_eq!(bus.emit(Signal::CartChanged), 1);
        assert_eq!(rx.recv().await.unwrap(), Signal::CartChanged);
    }
}
