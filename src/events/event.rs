//! # Events emitted while a dispatch session runs.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Session events**: a dispatch session starting and settling
//! - **Subscriber events**: a single subscriber being invoked, finishing, faulting or skipped
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the session
//! id, subscriber name and position, and a reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use fanvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SubscriberFaulted)
//!     .with_session(7)
//!     .with_subscriber("audit", 2)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::SubscriberFaulted);
//! assert_eq!(ev.subscriber.as_deref(), Some("audit"));
//! assert_eq!(ev.index, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of dispatch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Session events ===
    /// A dispatch session took its snapshot and is about to launch subscribers.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `count`: number of subscribers in the snapshot
    DispatchStarted,

    /// The session settled (exactly once per session).
    ///
    /// Sets:
    /// - `session`: session id
    /// - `count`: number of faults at settlement
    /// - `reason`: error label, absent on success
    DispatchSettled,

    // === Subscriber events ===
    /// A subscriber is being invoked.
    ///
    /// Sets:
    /// - `session`, `subscriber`, `index`
    /// - `reason`: `"direct"` or `"coroutine"`
    SubscriberInvoked,

    /// A subscriber finished without fault.
    ///
    /// Sets:
    /// - `session`, `subscriber`, `index`
    SubscriberFinished,

    /// A subscriber faulted.
    ///
    /// Sets:
    /// - `session`, `subscriber`, `index`
    /// - `reason`: fault message
    SubscriberFaulted,

    /// A subscriber was never launched because an earlier fault stopped the session.
    ///
    /// Sets:
    /// - `session`, `subscriber`, `index`
    LaunchSuppressed,

    // === Observer events ===
    /// An observer panicked while handling an event; the observer keeps running.
    ///
    /// Sets:
    /// - `subscriber`: observer name
    /// - `reason`: panic info/message
    ObserverPanicked,
}

/// Dispatch event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Dispatch session the event belongs to.
    pub session: Option<u64>,
    /// Name of the subscriber, if applicable.
    pub subscriber: Option<Arc<str>>,
    /// Position of the subscriber in the snapshot.
    pub index: Option<usize>,
    /// Subscriber or fault count, depending on kind.
    pub count: Option<usize>,
    /// Human-readable reason (fault messages, labels, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            session: None,
            subscriber: None,
            index: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a session id.
    #[inline]
    pub fn with_session(mut self, session: u64) -> Self {
        self.session = Some(session);
        self
    }

    /// Attaches a subscriber name and its snapshot position.
    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>, index: usize) -> Self {
        self.subscriber = Some(name.into());
        self.index = Some(index);
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::ObserverPanicked).with_reason(info);
        ev.subscriber = Some(observer.into());
        ev
    }

    /// True for `SubscriberFaulted`, late faults after settlement included.
    #[inline]
    pub fn is_fault(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberFaulted)
    }

    #[inline]
    pub fn is_observer_panic(&self) -> bool {
        matches!(self.kind, EventKind::ObserverPanicked)
    }
}
