//! # The argument pair every subscriber receives.
//!
//! A [`Notification`] bundles the `sender` and the `payload` of one broadcast
//! together with a global sequence number. The sequence number doubles as the
//! id of the dispatch session that delivers it.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter; every notification opens a new dispatch session.
static NOTIFICATION_SEQ: AtomicU64 = AtomicU64::new(1);

/// One broadcast: who sent it and what it carries.
///
/// The no-payload form is `Notification<S>` (payload `()`).
///
/// # Example
/// ```
/// use fanvisor::Notification;
///
/// let a = Notification::new("orders", 42_u32);
/// let b = Notification::new("orders", 43_u32);
/// assert_eq!(a.sender, "orders");
/// assert!(b.seq > a.seq);
/// ```
#[derive(Debug, Clone)]
pub struct Notification<S, P = ()> {
    /// Whoever raised the broadcast.
    pub sender: S,
    /// Broadcast payload.
    pub payload: P,
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp of creation.
    pub at: SystemTime,
}

impl<S, P> Notification<S, P> {
    /// Creates a notification with the next sequence number.
    pub fn new(sender: S, payload: P) -> Self {
        Self {
            sender,
            payload,
            seq: NOTIFICATION_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
        }
    }
}

impl<S> Notification<S, ()> {
    /// Creates a notification without payload.
    pub fn bare(sender: S) -> Self {
        Self::new(sender, ())
    }
}
