//! # Observer: user-facing event handlers
//!
//! The [`Observer`] trait is the extension point for watching dispatch sessions.
//! Every [`Event`] published on a [`Bus`] can be delivered to an observer by
//! [`observe`], which runs it on a dedicated worker task.
//!
//! ```text
//! Coordinator / Tracker ── publish(Event) ──► Bus ──► observe() worker
//!                                                        └─► Observer::on_event(&Event)
//!                                                              └─► panic → ObserverPanicked
//! ```
//!
//! ## Rules
//! - Events are processed sequentially (FIFO) per observer.
//! - A lagging observer skips the oldest events and keeps going.
//! - A panic is caught and published as `EventKind::ObserverPanicked`; the worker
//!   continues with the next event. Panics while handling an `ObserverPanicked`
//!   event are not re-published.
//!
//! # Example: custom observer
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use fanvisor::{Dispatcher, Event, EventKind, Observer, observe};
//!
//! struct FaultCounter;
//!
//! #[async_trait]
//! impl Observer for FaultCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::SubscriberFaulted) {
//!             // increment a counter, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "fault-counter" }
//! }
//!
//! # async fn demo() {
//! let dispatcher = Dispatcher::builder().with_event_bus().build();
//! let worker = observe(dispatcher.bus().unwrap(), Arc::new(FaultCounter));
//! # drop(worker);
//! # }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::error::SubscriberError;
use crate::events::{Bus, Event};

/// # Trait for receiving dispatch events from the bus.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    /// Called for every event observed on the bus.
    async fn on_event(&self, event: &Event);

    /// Returns the observer name used in `ObserverPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Spawns a worker that feeds every subsequent event on `bus` to `observer`.
///
/// The worker holds no [`Bus`] clone of its own: it ends once every clone held
/// elsewhere (dispatchers, user code) is dropped and the queued events are drained.
pub fn observe(bus: &Bus, observer: Arc<dyn Observer>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    let bus = bus.downgrade();

    tokio::spawn(async move {
        loop {
            let ev = match rx.recv().await {
                Ok(ev) => ev,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };

            let fut = observer.on_event(&ev);
            if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
                if !ev.is_observer_panic() {
                    let info = match SubscriberError::from_panic(panic) {
                        SubscriberError::Panicked { info } => info,
                        other => other.as_message(),
                    };
                    bus.publish(Event::observer_panicked(observer.name(), info));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Forward(mpsc::UnboundedSender<EventKind>);

    #[async_trait]
    impl Observer for Forward {
        async fn on_event(&self, event: &Event) {
            let _ = self.0.send(event.kind);
        }
    }

    struct Grumpy(Mutex<usize>);

    #[async_trait]
    impl Observer for Grumpy {
        async fn on_event(&self, event: &Event) {
            if event.kind == EventKind::SubscriberFaulted {
                panic!("cannot stand faults");
            }
            *self.0.lock().unwrap() += 1;
        }

        fn name(&self) -> &'static str {
            "grumpy"
        }
    }

    #[tokio::test]
    async fn test_observer_receives_events_in_order() {
        let bus = Bus::new(16);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _worker = observe(&bus, Arc::new(Forward(tx)));

        bus.publish(Event::new(EventKind::DispatchStarted));
        bus.publish(Event::new(EventKind::DispatchSettled));

        assert_eq!(rx.recv().await, Some(EventKind::DispatchStarted));
        assert_eq!(rx.recv().await, Some(EventKind::DispatchSettled));
    }

    #[tokio::test]
    async fn test_worker_ends_when_bus_is_dropped() {
        let dispatcher = crate::Dispatcher::builder().with_event_bus().build();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = observe(dispatcher.bus().unwrap(), Arc::new(Forward(tx)));

        dispatcher
            .bus()
            .unwrap()
            .publish(Event::new(EventKind::DispatchStarted));
        drop(dispatcher);

        tokio::time::timeout(Duration::from_millis(500), worker)
            .await
            .expect("worker outlived the bus")
            .unwrap();
        // Events queued before the drop are still delivered.
        assert_eq!(rx.recv().await, Some(EventKind::DispatchStarted));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_panicking_observer_is_isolated() {
        let bus = Bus::new(16);
        let mut watch = bus.subscribe();
        let grumpy = Arc::new(Grumpy(Mutex::new(0)));
        let _worker = observe(&bus, grumpy.clone());

        bus.publish(Event::new(EventKind::SubscriberFaulted));
        bus.publish(Event::new(EventKind::SubscriberFinished));

        let panicked = loop {
            let ev = watch.recv().await.unwrap();
            if ev.is_observer_panic() {
                break ev;
            }
        };
        assert_eq!(panicked.subscriber.as_deref(), Some("grumpy"));
        assert_eq!(panicked.reason.as_deref(), Some("cannot stand faults"));

        // SubscriberFinished and the ObserverPanicked event itself.
        while *grumpy.0.lock().unwrap() < 2 {
            tokio::task::yield_now().await;
        }
    }
}
