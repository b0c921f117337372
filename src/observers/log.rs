//! # Simple logging observer for debugging and demos.
//!
//! [`LogWriter`] prints dispatch events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [dispatch-started] session=3 subscribers=2
//! [invoked] session=3 subscriber=audit#0 kind=direct
//! [faulted] session=3 subscriber=audit#0 err="disk full"
//! [suppressed] session=3 subscriber=mailer#1
//! [dispatch-settled] session=3 faults=1 err=dispatch_fault
//! ```
//!
//! ## Example
//! ```no_run
//! # use std::sync::Arc;
//! # use fanvisor::{Dispatcher, LogWriter, observe};
//! # async fn demo() {
//! let dispatcher = Dispatcher::builder().with_event_bus().build();
//! observe(dispatcher.bus().unwrap(), Arc::new(LogWriter));
//! # }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observer;

/// Stdout logging observer.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// implement a custom [`Observer`] for structured logging or metrics.
pub struct LogWriter;

impl LogWriter {
    /// Renders one event as a log line.
    pub fn format(e: &Event) -> String {
        let session = e.session.unwrap_or_default();
        let who = match (&e.subscriber, e.index) {
            (Some(name), Some(idx)) => format!("{name}#{idx}"),
            (Some(name), None) => name.to_string(),
            _ => "?".to_string(),
        };
        match e.kind {
            EventKind::DispatchStarted => format!(
                "[dispatch-started] session={session} subscribers={}",
                e.count.unwrap_or_default()
            ),
            EventKind::DispatchSettled => match &e.reason {
                Some(err) => format!(
                    "[dispatch-settled] session={session} faults={} err={err}",
                    e.count.unwrap_or_default()
                ),
                None => format!("[dispatch-settled] session={session} faults=0"),
            },
            EventKind::SubscriberInvoked => format!(
                "[invoked] session={session} subscriber={who} kind={}",
                e.reason.as_deref().unwrap_or("?")
            ),
            EventKind::SubscriberFinished => {
                format!("[finished] session={session} subscriber={who}")
            }
            EventKind::SubscriberFaulted => format!(
                "[faulted] session={session} subscriber={who} err={:?}",
                e.reason.as_deref().unwrap_or_default()
            ),
            EventKind::LaunchSuppressed => {
                format!("[suppressed] session={session} subscriber={who}")
            }
            EventKind::ObserverPanicked => format!(
                "[observer-panicked] observer={who} info={:?}",
                e.reason.as_deref().unwrap_or_default()
            ),
        }
    }
}

#[async_trait]
impl Observer for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::format(e));
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
