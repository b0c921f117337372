//! # Async subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for stateful, struct-based
//! subscribers. Wrap an implementor with
//! [`Subscriber::from_subscribe`](crate::Subscriber::from_subscribe); it is
//! always dispatched as a coroutine subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use fanvisor::{Notification, Subscribe, Subscriber, SubscriberError};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe<&'static str, u64> for Metrics {
//!     async fn on_notify(
//!         &self,
//!         n: &Notification<&'static str, u64>,
//!     ) -> Result<(), SubscriberError> {
//!         // export n.payload, etc.
//!         let _ = n.payload;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "metrics" }
//! }
//!
//! let sub: Subscriber<&'static str, u64> = Subscriber::from_subscribe(Arc::new(Metrics));
//! assert_eq!(sub.name(), "metrics");
//! ```

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::subscribers::Notification;

/// Async subscriber receiving one [`Notification`] per dispatch.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Report failures through the returned `Result`. Panics are caught and
///   reported as [`SubscriberError::Panicked`], but shared state touched
///   while panicking may be left inconsistent.
#[async_trait]
pub trait Subscribe<S, P = ()>: Send + Sync + 'static {
    /// Handles a single notification.
    ///
    /// Runs on a runtime worker task, not in the dispatcher's context.
    async fn on_notify(&self, notification: &Notification<S, P>) -> Result<(), SubscriberError>;

    /// Returns the subscriber name used in faults and events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
