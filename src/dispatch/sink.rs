//! # Completion sink for coroutine subscribers.
//!
//! A [`CompletionSink`] is created for exactly one coroutine invocation and owns
//! the duty of reporting that subscriber's slot to the [`CompletionTracker`].
//!
//! ```text
//! coordinator ── tokio::spawn(sink.run(fut)) ──► worker thread
//!                                                  │
//!                       fut resolves Ok(())  ──────┼──► on_finished()
//!                       fut resolves Err(e)  ──────┼──► on_faulted(e)
//!                       fut panics (caught)  ──────┼──► on_faulted(Panicked)
//!                       task dropped by runtime ───┴──► Drop ──► on_faulted(Abandoned)
//! ```
//!
//! Every continuation of the subscriber's future is polled inside [`CompletionSink::run`],
//! so a panic raised after any number of suspensions is intercepted here rather than
//! surfacing as an unobserved task failure. Reporting happens once, after the future
//! has fully resolved, never at its first suspension point.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::tracker::{CompletionTracker, SlotOutcome};
use crate::error::SubscriberError;
use crate::subscribers::BoxSubscriberFuture;

/// Per-invocation listener bound to one tracker slot.
pub(crate) struct CompletionSink {
    tracker: Option<Arc<CompletionTracker>>,
    slot: usize,
    subscriber: Arc<str>,
}

impl CompletionSink {
    pub(crate) fn new(tracker: Arc<CompletionTracker>, slot: usize, subscriber: Arc<str>) -> Self {
        Self {
            tracker: Some(tracker),
            slot,
            subscriber,
        }
    }

    /// Drives the subscriber's future to completion and reports its outcome.
    pub(crate) async fn run(self, fut: BoxSubscriberFuture) {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => self.on_finished(),
            Ok(Err(err)) => self.on_faulted(err),
            Err(panic) => self.on_faulted(SubscriberError::from_panic(panic)),
        }
    }

    /// The subscriber resolved without fault.
    pub(crate) fn on_finished(mut self) {
        self.report(Ok(()));
    }

    /// The subscriber terminated with `err`.
    pub(crate) fn on_faulted(mut self, err: SubscriberError) {
        self.report(Err(err));
    }

    fn report(&mut self, outcome: Result<(), SubscriberError>) {
        if let Some(tracker) = self.tracker.take() {
            tracker.record_outcome(self.slot, &self.subscriber, SlotOutcome::Ran(outcome));
        }
    }
}

impl Drop for CompletionSink {
    fn drop(&mut self) {
        self.report(Err(SubscriberError::Abandoned));
    }
}
