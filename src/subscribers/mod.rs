//! # Subscribers: what a dispatch session fans out to.
//!
//! This module provides:
//! - [`Notification`] - the sender/payload pair every subscriber receives
//! - [`Subscriber`] - a named direct or coroutine callback, and [`classify`]
//! - [`Subscribe`] - async trait for struct-based coroutine subscribers
//! - [`SubscriberSet`] - ordered registry with immutable snapshots
//!
//! ## Subscriber kinds
//! ```text
//! Subscriber::direct(f)         ──► Direct    (outcome = return value)
//! Subscriber::coroutine(f)      ──► Coroutine (outcome = spawned future's result)
//! Subscriber::from_subscribe(s) ──► Coroutine
//! ```

mod notification;
mod set;
mod subscribe;
mod subscriber;

pub use notification::Notification;
pub use set::{SubscriberSet, SubscriptionId};
pub use subscribe::Subscribe;
pub(crate) use subscriber::Body;
pub use subscriber::{BoxSubscriberFuture, Subscriber, SubscriberKind, classify};
