//! # Ordered subscriber registry with immutable snapshots.
//!
//! [`SubscriberSet`] keeps the registration order of its subscribers and hands
//! out atomically obtained, immutable snapshots. A dispatch session works on the
//! snapshot taken when it begins; later `subscribe`/`unsubscribe` calls never
//! affect a session in flight.
//!
//! ## Architecture
//! ```text
//! subscribe(sub) ─┐                       ┌─► snapshot() ──► Arc<[Subscriber]>
//!                 ├─► rcu(ArcSwap<List>) ─┤
//! unsubscribe(id)─┘                       └─► emit(sender, payload) ──► Dispatcher
//! ```
//!
//! ## Example
//! ```rust
//! use fanvisor::{Subscriber, SubscriberSet};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let set: SubscriberSet<&'static str, u32> = SubscriberSet::new();
//! let id = set.subscribe(Subscriber::direct("print", |n| {
//!     println!("{} sent {}", n.sender, n.payload);
//!     Ok(())
//! }));
//!
//! set.emit("orders", 7).await.unwrap();
//! assert!(set.unsubscribe(id));
//! assert!(set.is_empty());
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use crate::config::DispatchConfig;
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::subscribers::Subscriber;

/// Opaque handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Immutable registration list; replaced wholesale on every change.
struct Registrations<S, P> {
    ids: Vec<SubscriptionId>,
    subscribers: Arc<[Subscriber<S, P>]>,
}

impl<S, P> Registrations<S, P> {
    fn empty() -> Self {
        Self {
            ids: Vec::new(),
            subscribers: Arc::from(Vec::new()),
        }
    }
}

/// Ordered collection of subscribers for one broadcast.
pub struct SubscriberSet<S, P = ()> {
    current: ArcSwap<Registrations<S, P>>,
    next_id: AtomicU64,
    dispatcher: Dispatcher,
}

impl<S, P> SubscriberSet<S, P> {
    /// Creates an empty set dispatching with default policies.
    pub fn new() -> Self {
        Self::with_dispatcher(Dispatcher::default())
    }

    /// Creates an empty set that dispatches through `dispatcher`.
    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            current: ArcSwap::from_pointee(Registrations::empty()),
            next_id: AtomicU64::new(0),
            dispatcher,
        }
    }

    /// Appends a subscriber; it will be invoked after every earlier registration.
    pub fn subscribe(&self, subscriber: Subscriber<S, P>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.current.rcu(|cur| {
            let mut ids = cur.ids.clone();
            let mut subscribers = cur.subscribers.to_vec();
            ids.push(id);
            subscribers.push(subscriber.clone());
            Registrations {
                ids,
                subscribers: subscribers.into(),
            }
        });
        id
    }

    /// Removes a registration. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        self.current.rcu(|cur| {
            removed = false;
            let Some(pos) = cur.ids.iter().position(|x| *x == id) else {
                return Arc::clone(cur);
            };
            removed = true;
            let mut ids = cur.ids.clone();
            let mut subscribers = cur.subscribers.to_vec();
            ids.remove(pos);
            subscribers.remove(pos);
            Arc::new(Registrations {
                ids,
                subscribers: subscribers.into(),
            })
        });
        removed
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.current.store(Arc::new(Registrations::empty()));
    }

    /// Returns the current subscribers in registration order.
    pub fn snapshot(&self) -> Arc<[Subscriber<S, P>]> {
        Arc::clone(&self.current.load().subscribers)
    }

    pub fn len(&self) -> usize {
        self.current.load().ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the dispatcher used by [`emit`](Self::emit).
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl<S, P> SubscriberSet<S, P>
where
    S: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Broadcasts to a snapshot of the current subscribers using the dispatcher's policies.
    pub async fn emit(&self, sender: S, payload: P) -> Result<(), DispatchError> {
        let snapshot = self.snapshot();
        self.dispatcher.dispatch(&snapshot, sender, payload).await
    }

    /// Broadcasts with explicit policies.
    pub async fn emit_with(
        &self,
        sender: S,
        payload: P,
        config: DispatchConfig,
    ) -> Result<(), DispatchError> {
        let snapshot = self.snapshot();
        self.dispatcher
            .dispatch_with(&snapshot, sender, payload, config)
            .await
    }
}

impl<S> SubscriberSet<S, ()>
where
    S: Send + Sync + 'static,
{
    /// Broadcasts a notification without payload.
    pub async fn notify(&self, sender: S) -> Result<(), DispatchError> {
        self.emit(sender, ()).await
    }
}

impl<S, P> Default for SubscriberSet<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubscriberError;
    use std::sync::atomic::AtomicUsize;

    fn counting(name: &'static str, hits: &Arc<AtomicUsize>) -> Subscriber<&'static str> {
        let hits = Arc::clone(hits);
        Subscriber::direct(name, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let set: SubscriberSet<&'static str> = SubscriberSet::new();
        let hits = Arc::new(AtomicUsize::new(0));
        set.subscribe(counting("a", &hits));
        let b = set.subscribe(counting("b", &hits));
        set.subscribe(counting("c", &hits));

        let names: Vec<_> = set.snapshot().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        assert!(set.unsubscribe(b));
        assert!(!set.unsubscribe(b));
        let names: Vec<_> = set.snapshot().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_changes() {
        let set: SubscriberSet<&'static str> = SubscriberSet::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let a = set.subscribe(counting("a", &hits));

        let before = set.snapshot();
        set.subscribe(counting("b", &hits));
        set.unsubscribe(a);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name(), "a");
        assert_eq!(set.snapshot()[0].name(), "b");

        set.clear();
        assert!(set.is_empty());
        assert_eq!(before.len(), 1);
    }

    #[tokio::test]
    async fn test_notify_runs_every_subscriber() {
        let set: SubscriberSet<&'static str> = SubscriberSet::new();
        let hits = Arc::new(AtomicUsize::new(0));
        set.subscribe(counting("a", &hits));
        set.subscribe(counting("b", &hits));

        set.notify("test").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_emit_with_collects_all_faults() {
        let set: SubscriberSet<&'static str, u32> = SubscriberSet::new();
        set.subscribe(Subscriber::direct("odd", |n| {
            if n.payload % 2 == 1 {
                return Err(SubscriberError::fail("odd"));
            }
            Ok(())
        }));
        set.subscribe(Subscriber::coroutine("small", |n| async move {
            if n.payload < 10 {
                return Err(SubscriberError::fail("small"));
            }
            Ok(())
        }));

        let err = set
            .emit_with("test", 3, DispatchConfig::default().collect_all())
            .await
            .unwrap_err();
        assert_eq!(err.faults().len(), 2);

        assert!(set.emit("test", 12).await.is_ok());
    }
}
