//! # Dispatch coordinator: one broadcast over a fixed snapshot.
//!
//! Walks the snapshot in order, invokes each subscriber and applies the ordering
//! and failure policies of [`DispatchConfig`].
//!
//! ## Flow
//! ```text
//! for (slot, sub) in snapshot:
//!   ├─► stop_on_first_error && tracker has a fault ──► stop launching
//!   ├─► Direct    ──► call inline (panics caught) ──► tracker.record_outcome(slot)
//!   ├─► Coroutine ──► tokio::spawn(CompletionSink::run(f(notification)))
//!   └─► ordered   ──► tracker.wait_slot(slot).await
//!
//! unlaunched slots ──► record_outcome(Suppressed)
//! tracker.settled().await ──► Result<(), DispatchError>
//! ```
//!
//! ## Rules
//! - A subscriber fault never aborts the loop; only `stop_on_first_error` suppresses
//!   *later* launches.
//! - Launched subscribers are never cancelled. The coordinator returns only after each
//!   of them has reported, so no outcome is lost.
//! - Under `ordered = false` and `stop_on_first_error = true`, how many coroutines start
//!   before the first fault lands depends on scheduling.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::sink::CompletionSink;
use super::tracker::{CompletionTracker, SlotOutcome};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, SubscriberError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Body, Notification, Subscriber};

/// Broadcasts `sender`/`payload` to every subscriber of the snapshot.
///
/// Resolves once every launched subscriber, direct or coroutine, has finished.
/// Must be called from within a Tokio runtime; coroutine subscribers are spawned on it.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use fanvisor::{DispatchConfig, Subscriber, SubscriberError, dispatch};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let hits = Arc::new(AtomicUsize::new(0));
/// let h = Arc::clone(&hits);
/// let subs: Vec<Subscriber<&'static str, u32>> = vec![
///     Subscriber::direct("fails", |_| Err(SubscriberError::fail("E"))),
///     Subscriber::coroutine("counts", move |_| {
///         let h = Arc::clone(&h);
///         async move {
///             h.fetch_add(1, Ordering::SeqCst);
///             Ok(())
///         }
///     }),
/// ];
///
/// let err = dispatch(&subs, "demo", 1, DispatchConfig::default()).await.unwrap_err();
/// assert_eq!(err.faults().len(), 1);
/// assert_eq!(hits.load(Ordering::SeqCst), 0); // fail-fast: never launched
/// # }
/// ```
pub async fn dispatch<S, P>(
    subscribers: &[Subscriber<S, P>],
    sender: S,
    payload: P,
    config: DispatchConfig,
) -> Result<(), DispatchError>
where
    S: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    run_session(subscribers, Notification::new(sender, payload), config, None).await
}

pub(crate) async fn run_session<S, P>(
    subscribers: &[Subscriber<S, P>],
    notification: Notification<S, P>,
    config: DispatchConfig,
    bus: Option<&Bus>,
) -> Result<(), DispatchError>
where
    S: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    let notification = Arc::new(notification);
    let session = notification.seq;
    if let Some(bus) = bus {
        bus.publish(
            Event::new(EventKind::DispatchStarted)
                .with_session(session)
                .with_count(subscribers.len()),
        );
    }

    let tracker = CompletionTracker::new(
        session,
        subscribers.len(),
        config.stop_on_first_error,
        bus.cloned(),
    );

    let mut launched = 0;
    for (slot, sub) in subscribers.iter().enumerate() {
        if config.stop_on_first_error && tracker.faults_recorded() > 0 {
            break;
        }
        launched = slot + 1;

        if let Some(bus) = bus {
            bus.publish(
                Event::new(EventKind::SubscriberInvoked)
                    .with_session(session)
                    .with_subscriber(Arc::clone(sub.name_arc()), slot)
                    .with_reason(sub.kind().as_label()),
            );
        }
        invoke(&tracker, slot, sub, &notification);

        if config.ordered {
            tracker.wait_slot(slot).await;
        }
    }

    for (slot, sub) in subscribers.iter().enumerate().skip(launched) {
        tracker.record_outcome(slot, sub.name_arc(), SlotOutcome::Suppressed);
    }

    tracker.settled().await
}

/// Starts one subscriber; direct subscribers are reported before this returns.
fn invoke<S, P>(
    tracker: &Arc<CompletionTracker>,
    slot: usize,
    sub: &Subscriber<S, P>,
    notification: &Arc<Notification<S, P>>,
) where
    S: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    match sub.body() {
        Body::Direct(f) => {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(notification.as_ref())))
                .unwrap_or_else(|p| Err(SubscriberError::from_panic(p)));
            tracker.record_outcome(slot, sub.name_arc(), SlotOutcome::Ran(outcome));
        }
        Body::Coroutine(f) => {
            let sink = CompletionSink::new(Arc::clone(tracker), slot, Arc::clone(sub.name_arc()));
            // The call that builds the future may itself panic before any suspension.
            match panic::catch_unwind(AssertUnwindSafe(|| f(Arc::clone(notification)))) {
                Ok(fut) => {
                    tokio::spawn(sink.run(fut));
                }
                Err(p) => sink.on_faulted(SubscriberError::from_panic(p)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    type Sub = Subscriber<&'static str, u32>;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn bump(name: &'static str, c: &Arc<AtomicUsize>) -> Sub {
        let c = Arc::clone(c);
        Subscriber::direct(name, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn bump_later(name: &'static str, c: &Arc<AtomicUsize>) -> Sub {
        let c = Arc::clone(c);
        Subscriber::coroutine(name, move |_| {
            let c = Arc::clone(&c);
            async move {
                sleep(Duration::from_millis(10)).await;
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    fn failing(name: &'static str, msg: &'static str) -> Sub {
        Subscriber::direct(name, move |_| Err(SubscriberError::fail(msg)))
    }

    fn failing_later(name: &'static str, msg: &'static str) -> Sub {
        Subscriber::coroutine(name, move |_| async move {
            tokio::task::yield_now().await;
            Err(SubscriberError::fail(msg))
        })
    }

    fn errors(err: &DispatchError) -> Vec<SubscriberError> {
        err.faults().iter().map(|f| f.error.clone()).collect()
    }

    #[tokio::test]
    async fn test_ordered_serializes_completion() {
        let a = counter();
        let b = counter();
        let h1 = bump_later("h1", &a);
        let h2 = {
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            Subscriber::direct("h2", move |_| {
                if a.load(Ordering::SeqCst) != 1 {
                    return Err(SubscriberError::fail("h1 not finished"));
                }
                b.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };

        dispatch(&[h1, h2], "t", 0, DispatchConfig::default())
            .await
            .unwrap();
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fail_fast_suppresses_later_subscribers() {
        let b = counter();
        let subs = [failing("h1", "E"), bump("h2", &b)];

        let err = dispatch(&subs, "t", 0, DispatchConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Fault(_)));
        assert_eq!(errors(&err), [SubscriberError::fail("E")]);
        assert_eq!(b.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collect_all_runs_every_subscriber() {
        let b = counter();
        let subs = [failing("h1", "E"), bump("h2", &b)];

        let err = dispatch(&subs, "t", 0, DispatchConfig::default().collect_all())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Fault(_)));
        assert_eq!(errors(&err), [SubscriberError::fail("E")]);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_aggregate_keeps_fault_order() {
        let subs = [failing_later("h1", "E1"), failing("h2", "E2")];

        let err = dispatch(&subs, "t", 0, DispatchConfig::default().collect_all())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Aggregate { .. }));
        assert_eq!(
            errors(&err),
            [SubscriberError::fail("E1"), SubscriberError::fail("E2")]
        );
        let names: Vec<_> = err.faults().iter().map(|f| f.subscriber.to_string()).collect();
        assert_eq!(names, ["h1", "h2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unordered_fail_fast_is_never_silent() {
        for _ in 0..50 {
            let b = counter();
            let subs = [failing_later("h1", "E"), bump_later("h2", &b)];

            let err = dispatch(&subs, "t", 0, DispatchConfig::default().unordered())
                .await
                .unwrap_err();
            assert!(errors(&err).contains(&SubscriberError::fail("E")));
            assert!(b.load(Ordering::SeqCst) <= 1);
        }
    }

    #[tokio::test]
    async fn test_unordered_coroutines_overlap() {
        let running = counter();
        let peak = counter();
        let make = |name: &'static str| -> Sub {
            let (running, peak) = (Arc::clone(&running), Arc::clone(&peak));
            Subscriber::coroutine(name, move |_| {
                let (running, peak) = (Arc::clone(&running), Arc::clone(&peak));
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        let subs = [make("a"), make("b"), make("c")];

        dispatch(&subs, "t", 0, DispatchConfig::default().unordered())
            .await
            .unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(running.load(Ordering::SeqCst), 0);

        peak.store(0, Ordering::SeqCst);
        dispatch(&subs, "t", 0, DispatchConfig::default())
            .await
            .unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_waits_for_background_work() {
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let subs: [Sub; 1] = [Subscriber::coroutine("slow", move |_| {
            let flag = Arc::clone(&flag);
            async move {
                sleep(Duration::from_millis(30)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        })];

        dispatch(&subs, "t", 0, DispatchConfig::default().unordered())
            .await
            .unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_early_settlement_still_awaits_launched_work() {
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let b = counter();
        let subs: [Sub; 3] = [
            Subscriber::coroutine("slow", move |_| {
                let flag = Arc::clone(&flag);
                async move {
                    sleep(Duration::from_millis(30)).await;
                    flag.store(true, Ordering::SeqCst);
                    Err(SubscriberError::fail("late"))
                }
            }),
            failing("fast", "E"),
            bump("never", &b),
        ];

        let err = dispatch(&subs, "t", 0, DispatchConfig::default().unordered())
            .await
            .unwrap_err();

        assert!(done.load(Ordering::SeqCst));
        assert!(matches!(err, DispatchError::Fault(ref f) if f.index == 1));
        assert_eq!(errors(&err), [SubscriberError::fail("E")]);
        assert_eq!(b.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panics_become_faults() {
        let subs: [Sub; 3] = [
            Subscriber::direct("direct", |_| panic!("direct boom")),
            Subscriber::coroutine("body", |_| async {
                tokio::task::yield_now().await;
                if true {
                    panic!("body boom");
                }
                Ok(())
            }),
            Subscriber::coroutine("factory", |_| -> std::future::Ready<Result<(), SubscriberError>> {
                panic!("factory boom")
            }),
        ];

        let err = dispatch(&subs, "t", 0, DispatchConfig::default().collect_all())
            .await
            .unwrap_err();
        let infos: Vec<_> = errors(&err)
            .into_iter()
            .map(|e| match e {
                SubscriberError::Panicked { info } => info,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(infos, ["direct boom", "body boom", "factory boom"]);
    }

    #[tokio::test]
    async fn test_empty_snapshot_resolves_ok() {
        let subs: [Sub; 0] = [];
        assert!(dispatch(&subs, "t", 0, DispatchConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_see_sender_and_payload() {
        let seen = counter();
        let s = Arc::clone(&seen);
        let subs: [Sub; 1] = [Subscriber::direct("check", move |n| {
            assert_eq!(n.sender, "orders");
            s.store(n.payload as usize, Ordering::SeqCst);
            Ok(())
        })];

        dispatch(&subs, "orders", 42, DispatchConfig::default())
            .await
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[tokio::test]
    async fn test_events_trace_one_session() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let b = counter();
        let subs = [failing("h1", "E"), bump("h2", &b)];

        let notification = Notification::new("t", 0);
        let session = notification.seq;
        let _ = run_session(&subs, notification, DispatchConfig::default(), Some(&bus)).await;

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.session, Some(session));
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            [
                EventKind::DispatchStarted,
                EventKind::SubscriberInvoked,
                EventKind::SubscriberFaulted,
                EventKind::DispatchSettled,
                EventKind::LaunchSuppressed,
            ]
        );
    }
}
