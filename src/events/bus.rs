//! # Event bus for broadcasting dispatch events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the coordinator, the tracker and every
//! completion sink, possibly on different worker threads.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                  Receivers (any):
//!   Coordinator ──┐
//!   Tracker     ──┼──────► Bus ───────► LogWriter / user receivers
//!   Sink 1..N   ──┘  (broadcast chan)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for dispatch events.
///
/// ### Properties
/// - **Shared by sessions**: one bus may serve many dispatchers; events carry their session id.
/// - **Thread-agnostic**: sinks publish from whichever worker their coroutine finished on.
/// - **Cloneable**: every clone holds a sender and keeps the channel open.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// ### Notes
    /// - One ring buffer of `capacity` events serves every receiver.
    /// - A capacity of 0 is raised to 1, matching `DispatchConfig::bus_capacity_clamped`.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// A session with no listening observers still publishes; the event is simply dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// - Events published before this call are never seen.
    /// - The receiver reports `RecvError::Closed` once every [`Bus`] clone is dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns a handle that can publish without keeping the channel open.
    pub(crate) fn downgrade(&self) -> WeakBus {
        WeakBus {
            tx: self.tx.downgrade(),
        }
    }
}

/// Non-owning publisher used by background workers fed from the same bus.
#[derive(Clone, Debug)]
pub(crate) struct WeakBus {
    tx: broadcast::WeakSender<Event>,
}

impl WeakBus {
    /// Publishes if any [`Bus`] clone is still alive; otherwise drops the event.
    pub(crate) fn publish(&self, ev: Event) {
        if let Some(tx) = self.tx.upgrade() {
            let _ = tx.send(ev);
        }
    }
}
