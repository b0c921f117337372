//! # fanvisor
//!
//! **Fanvisor** is a fan-out dispatch and completion-tracking engine for async Rust.
//!
//! A dispatch session broadcasts one notification (sender + payload) to an ordered
//! set of subscribers and reports a single aggregated outcome once every launched
//! subscriber has *truly* finished, including work it moved onto background tasks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!  │  Subscriber  │   │  Subscriber  │   │  Subscriber  │
//!  │   (direct)   │   │ (coroutine)  │   │ (coroutine)  │
//!  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!         ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  SubscriberSet (ordered registry, immutable snapshots)        │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 ▼  snapshot + Notification
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Dispatcher / dispatch()                                      │
//! │  - coordinator: ordered / unordered, fail-fast / collect-all  │
//! │  - CompletionSink: wraps each spawned coroutine               │
//! │  - CompletionTracker: counts, faults, settle-once             │
//! └───────┬──────────────────────────────────────────────┬────────┘
//!         │ Result<(), DispatchError>                    │ Events
//!         ▼                                              ▼
//!      caller                                   Bus (broadcast channel)
//!                                                        │
//!                                               observe() workers
//!                                                        ▼
//!                                                Observer::on_event
//! ```
//!
//! ### Session lifecycle
//! ```text
//! dispatch(snapshot, sender, payload, config)
//!   ├─► publish DispatchStarted{ session, count }
//!   ├─► for each subscriber i:
//!   │     ├─ stop_on_first_error && fault seen ─► LaunchSuppressed, stop launching
//!   │     ├─ Direct    ─► call, outcome = return value (panic → Panicked)
//!   │     ├─ Coroutine ─► spawn(sink.run(fut)), outcome = future result
//!   │     └─ ordered   ─► wait until slot i reported
//!   ├─► wait for settlement (all slots reported, or first fault under fail-fast)
//!   ├─► wait for every launched slot to report
//!   └─► Ok(()) | DispatchError::Fault | DispatchError::Aggregate
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                           |
//! |-------------------|-----------------------------------------------------------------|----------------------------------------------|
//! | **Subscribers**   | Direct closures, spawned coroutines and struct-based handlers.  | [`Subscriber`], [`Subscribe`], [`classify`]  |
//! | **Registry**      | Ordered subscription with snapshot-consistent emission.        | [`SubscriberSet`], [`SubscriptionId`]        |
//! | **Dispatch**      | One-shot sessions or a long-lived dispatcher with an event bus. | [`dispatch`], [`Dispatcher`]                 |
//! | **Errors**        | Typed subscriber faults and aggregated dispatch errors.         | [`SubscriberError`], [`DispatchError`]       |
//! | **Events**        | Session and subscriber lifecycle events for observers.          | [`Event`], [`Bus`], [`Observer`]             |
//! | **Configuration** | Ordering and failure policies.                                  | [`DispatchConfig`]                           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use fanvisor::{DispatchConfig, Subscriber, SubscriberError, SubscriberSet};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let set: SubscriberSet<&'static str, u32> = SubscriberSet::new();
//!
//!     set.subscribe(Subscriber::direct("audit", |n| {
//!         println!("{} sent {}", n.sender, n.payload);
//!         Ok(())
//!     }));
//!     set.subscribe(Subscriber::coroutine("mailer", |n| {
//!         let payload = n.payload;
//!         async move {
//!             tokio::task::yield_now().await;
//!             if payload == 0 {
//!                 return Err(SubscriberError::fail("empty payload"));
//!             }
//!             Ok(())
//!         }
//!     }));
//!
//!     set.emit("orders", 42).await.unwrap();
//!
//!     let err = set
//!         .emit_with("orders", 0, DispatchConfig::default().collect_all())
//!         .await
//!         .unwrap_err();
//!     assert_eq!(err.faults().len(), 1);
//! }
//! ```
mod config;
mod dispatch;
mod error;
mod events;
mod observers;
mod subscribers;

// ---- Public re-exports ----

pub use config::DispatchConfig;
pub use dispatch::{Dispatcher, DispatcherBuilder, dispatch};
pub use error::{DispatchError, Fault, SubscriberError};
pub use events::{Bus, Event, EventKind};
pub use observers::{Observer, observe};
pub use subscribers::{
    BoxSubscriberFuture, Notification, Subscribe, Subscriber, SubscriberKind, SubscriberSet,
    SubscriptionId, classify,
};

// Optional: expose a simple built-in logging observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
