//! Dispatch engine: coordination and completion tracking.
//!
//! Internal modules:
//! - [`coordinator`]: walks a snapshot and applies ordering/failure policies;
//! - [`tracker`]: per-session counters, faults and the settle-once state machine;
//! - [`sink`]: reports a coroutine subscriber's true completion to the tracker;
//! - [`dispatcher`]: long-lived entry point with default policies and an event bus.
//!
//! ```text
//! dispatch(snapshot, sender, payload, config)
//!     │
//!     ▼
//! coordinator ──► Direct    ──────────────────────────► tracker.record_outcome
//!     │       └─► Coroutine ──► spawn(sink.run(fut)) ──► tracker.record_outcome
//!     ▼
//! tracker.settled() ──► Result<(), DispatchError>
//! ```

mod coordinator;
mod dispatcher;
mod sink;
mod tracker;

pub use coordinator::dispatch;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
