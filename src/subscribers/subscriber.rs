//! # Subscribers and their classification.
//!
//! A [`Subscriber`] is one unit of work that a dispatch session invokes with a
//! [`Notification`]. It comes in two kinds:
//!
//! - **Direct**: a synchronous closure. Its outcome is known the instant the call returns.
//! - **Coroutine**: a closure returning a future (or an implementor of [`Subscribe`]).
//!   Invoking it only *starts* the work; the engine spawns the future and learns the
//!   outcome later through a completion sink.
//!
//! The kind is fixed when the subscriber is constructed and never changes, so
//! [`classify`] is a pure read.
//!
//! ## Example
//! ```rust
//! use fanvisor::{Subscriber, SubscriberError, SubscriberKind, classify};
//!
//! let direct: Subscriber<&'static str, u32> = Subscriber::direct("count", |n| {
//!     if n.payload == 0 {
//!         return Err(SubscriberError::fail("empty"));
//!     }
//!     Ok(())
//! });
//! let background: Subscriber<&'static str, u32> = Subscriber::coroutine("flush", |n| async move {
//!     let _ = n.payload;
//!     Ok(())
//! });
//!
//! assert_eq!(classify(&direct), SubscriberKind::Direct);
//! assert_eq!(classify(&background), SubscriberKind::Coroutine);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::SubscriberError;
use crate::subscribers::{Notification, Subscribe};

/// Boxed future produced by a coroutine subscriber.
pub type BoxSubscriberFuture = BoxFuture<'static, Result<(), SubscriberError>>;

type DirectFn<S, P> = dyn Fn(&Notification<S, P>) -> Result<(), SubscriberError> + Send + Sync;
type CoroutineFn<S, P> = dyn Fn(Arc<Notification<S, P>>) -> BoxSubscriberFuture + Send + Sync;

/// How a subscriber reports its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberKind {
    /// Outcome is the return value of the call.
    Direct,
    /// Outcome arrives when the spawned future resolves.
    Coroutine,
}

impl SubscriberKind {
    #[inline]
    pub fn is_coroutine(self) -> bool {
        matches!(self, SubscriberKind::Coroutine)
    }

    /// Returns a short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            SubscriberKind::Direct => "direct",
            SubscriberKind::Coroutine => "coroutine",
        }
    }
}

pub(crate) enum Body<S, P> {
    Direct(Arc<DirectFn<S, P>>),
    Coroutine(Arc<CoroutineFn<S, P>>),
}

/// A named, cheaply cloneable subscriber.
pub struct Subscriber<S, P = ()> {
    name: Arc<str>,
    body: Body<S, P>,
}

impl<S, P> Subscriber<S, P> {
    /// Creates a direct subscriber from a synchronous closure.
    pub fn direct<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Notification<S, P>) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        Self {
            name: name.into().into(),
            body: Body::Direct(Arc::new(f)),
        }
    }

    /// Creates a coroutine subscriber from a closure producing a fresh future per call.
    pub fn coroutine<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(Arc<Notification<S, P>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SubscriberError>> + Send + 'static,
    {
        let body = move |n: Arc<Notification<S, P>>| -> BoxSubscriberFuture { Box::pin(f(n)) };
        Self {
            name: name.into().into(),
            body: Body::Coroutine(Arc::new(body)),
        }
    }

    /// Wraps an async [`Subscribe`] implementor as a coroutine subscriber.
    pub fn from_subscribe(sub: Arc<dyn Subscribe<S, P>>) -> Self
    where
        S: Send + Sync + 'static,
        P: Send + Sync + 'static,
    {
        let name: Arc<str> = sub.name().into();
        let body = move |n: Arc<Notification<S, P>>| -> BoxSubscriberFuture {
            let sub = Arc::clone(&sub);
            Box::pin(async move { sub.on_notify(&n).await })
        };
        Self {
            name,
            body: Body::Coroutine(Arc::new(body)),
        }
    }

    /// Returns the subscriber name used in faults and events.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    /// Returns the subscriber kind (fixed at construction).
    #[inline]
    pub fn kind(&self) -> SubscriberKind {
        match self.body {
            Body::Direct(_) => SubscriberKind::Direct,
            Body::Coroutine(_) => SubscriberKind::Coroutine,
        }
    }

    pub(crate) fn body(&self) -> &Body<S, P> {
        &self.body
    }
}

/// Classifies a subscriber as [`SubscriberKind::Direct`] or [`SubscriberKind::Coroutine`].
#[inline]
pub fn classify<S, P>(subscriber: &Subscriber<S, P>) -> SubscriberKind {
    subscriber.kind()
}

impl<S, P> Clone for Subscriber<S, P> {
    fn clone(&self) -> Self {
        let body = match &self.body {
            Body::Direct(f) => Body::Direct(Arc::clone(f)),
            Body::Coroutine(f) => Body::Coroutine(Arc::clone(f)),
        };
        Self {
            name: Arc::clone(&self.name),
            body,
        }
    }
}

impl<S, P> fmt::Debug for Subscriber<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}
