//! Dispatch events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the dispatch coordinator (start, invoke, suppress), the completion
//!   tracker (finish, fault, settle) and completion sinks through the tracker.
//! - **Consumers**: observers attached with [`observe`](crate::observe) (such as the
//!   `LogWriter` of the `logging` feature), or any receiver from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub(crate) use bus::WeakBus;
pub use event::{Event, EventKind};
