//! # Completion tracker: per-session outcome bookkeeping.
//!
//! One [`CompletionTracker`] exists per dispatch session. It is shared (via `Arc`)
//! between the coordinator, which reports direct subscribers, and every
//! completion sink, which reports coroutine subscribers from whatever worker
//! thread they finished on.
//!
//! ## State machine
//! ```text
//! record_outcome(slot, outcome)
//!   ├─► slot already reported? ──► ignore
//!   ├─► outcome is Err ──► faults.push(fault)
//!   ├─► remaining -= 1
//!   └─► remaining == 0 || (stop_on_first_error && first fault)
//!          └─► Pending ──► Settled(outcome)   (exactly once, under the lock)
//! ```
//!
//! ## Rules
//! - Every slot is decremented at most once, whoever reports it.
//! - Settlement is a check-and-set under the single session mutex; later reports
//!   update bookkeeping but never overwrite the settled outcome.
//! - Waiters (`wait_slot`, `settled`) are woken through one [`Notify`] after every report.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::error::{DispatchError, Fault, SubscriberError};
use crate::events::{Bus, Event, EventKind};

enum Settlement {
    Pending,
    Settled(Result<(), DispatchError>),
}

struct TrackerState {
    remaining: usize,
    reported: Vec<bool>,
    faults: Vec<Fault>,
    settlement: Settlement,
}

/// How a slot left the session.
pub(crate) enum SlotOutcome {
    /// The subscriber ran and produced this result.
    Ran(Result<(), SubscriberError>),
    /// The subscriber was never launched.
    Suppressed,
}

/// Shared, thread-safe completion state of one dispatch session.
pub(crate) struct CompletionTracker {
    session: u64,
    stop_on_first_error: bool,
    state: Mutex<TrackerState>,
    changed: Notify,
    bus: Option<Bus>,
}

impl CompletionTracker {
    /// Creates a tracker expecting one report per slot.
    ///
    /// A tracker with zero slots is settled with `Ok(())` immediately.
    pub(crate) fn new(
        session: u64,
        slots: usize,
        stop_on_first_error: bool,
        bus: Option<Bus>,
    ) -> Arc<Self> {
        let settlement = if slots == 0 {
            Settlement::Settled(Ok(()))
        } else {
            Settlement::Pending
        };
        Arc::new(Self {
            session,
            stop_on_first_error,
            state: Mutex::new(TrackerState {
                remaining: slots,
                reported: vec![false; slots],
                faults: Vec::new(),
                settlement,
            }),
            changed: Notify::new(),
            bus,
        })
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the outcome of `slot`; duplicates and out-of-range slots are ignored.
    pub(crate) fn record_outcome(&self, slot: usize, subscriber: &Arc<str>, outcome: SlotOutcome) {
        let mut events = Vec::with_capacity(2);
        {
            let mut st = self.lock();
            match st.reported.get_mut(slot) {
                Some(seen) if !*seen => *seen = true,
                _ => return,
            }

            let mut first_fault = false;
            match outcome {
                SlotOutcome::Ran(Ok(())) => {
                    events.push(self.slot_event(EventKind::SubscriberFinished, subscriber, slot));
                }
                SlotOutcome::Ran(Err(error)) => {
                    events.push(
                        self.slot_event(EventKind::SubscriberFaulted, subscriber, slot)
                            .with_reason(error.to_string()),
                    );
                    st.faults.push(Fault {
                        subscriber: Arc::clone(subscriber),
                        index: slot,
                        error,
                    });
                    first_fault = st.faults.len() == 1;
                }
                SlotOutcome::Suppressed => {
                    events.push(self.slot_event(EventKind::LaunchSuppressed, subscriber, slot));
                }
            }
            st.remaining -= 1;

            let trigger = st.remaining == 0 || (self.stop_on_first_error && first_fault);
            if trigger && matches!(st.settlement, Settlement::Pending) {
                let outcome = match DispatchError::from_faults(st.faults.clone()) {
                    None => Ok(()),
                    Some(err) => Err(err),
                };
                let mut ev = Event::new(EventKind::DispatchSettled)
                    .with_session(self.session)
                    .with_count(st.faults.len());
                if let Err(err) = &outcome {
                    ev = ev.with_reason(err.as_label());
                }
                events.push(ev);
                st.settlement = Settlement::Settled(outcome);
            }
        }

        self.changed.notify_waiters();
        if let Some(bus) = &self.bus {
            for ev in events {
                bus.publish(ev);
            }
        }
    }

    fn slot_event(&self, kind: EventKind, subscriber: &Arc<str>, slot: usize) -> Event {
        Event::new(kind)
            .with_session(self.session)
            .with_subscriber(Arc::clone(subscriber), slot)
    }

    /// Number of faults captured so far, including those after settlement.
    pub(crate) fn faults_recorded(&self) -> usize {
        self.lock().faults.len()
    }

    #[cfg(test)]
    pub(crate) fn is_settled(&self) -> bool {
        matches!(self.lock().settlement, Settlement::Settled(_))
    }

    /// Waits until `slot` has reported finish or fault.
    pub(crate) async fn wait_slot(&self, slot: usize) {
        self.wait_until(|st| st.reported.get(slot).copied().unwrap_or(true))
            .await;
    }

    /// Waits until every slot reported, then returns the settled outcome.
    pub(crate) async fn settled(&self) -> Result<(), DispatchError> {
        loop {
            let notified = self.changed.notified();
            {
                let st = self.lock();
                if st.remaining == 0 {
                    if let Settlement::Settled(outcome) = &st.settlement {
                        return outcome.clone();
                    }
                }
            }
            notified.await;
        }
    }

    async fn wait_until(&self, done: impl Fn(&TrackerState) -> bool) {
        loop {
            let notified = self.changed.notified();
            let ready = done(&self.lock());
            if ready {
                return;
            }
            notified.await;
        }
    }
}
