//! # Dispatch configuration.
//!
//! Provides [`DispatchConfig`], the ordering and failure policy of a dispatch session.
//!
//! Config is used in two ways:
//! 1. **Per call**: `dispatch(&subs, sender, payload, config)` / `SubscriberSet::emit_with`
//! 2. **Dispatcher defaults**: `Dispatcher::builder().with_config(config)`
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 when a [`Bus`](crate::Bus) is built from it

/// Ordering and failure policy for one dispatch session.
///
/// ## Field semantics
/// - `ordered`: subscriber *i+1* starts only after subscriber *i* fully finished
/// - `stop_on_first_error`: stop launching subscribers once any fault was captured
/// - `bus_capacity`: ring buffer size for the event bus built by `Dispatcher::builder`
///
/// ## Example
/// ```
/// use fanvisor::DispatchConfig;
///
/// let cfg = DispatchConfig::default().unordered().collect_all();
/// assert!(!cfg.ordered);
/// assert!(!cfg.stop_on_first_error);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Serialize subscribers over their full completion.
    ///
    /// - `true` = wait for each subscriber (including background work) before invoking the next
    /// - `false` = invoke every subscriber back to back; coroutines overlap
    pub ordered: bool,

    /// Stop launching further subscribers after the first captured fault.
    ///
    /// Already launched subscribers are never cancelled and are still awaited.
    /// Under `ordered = false` this is best-effort: coroutines already in flight
    /// may or may not contribute to the reported outcome.
    pub stop_on_first_error: bool,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
}

impl DispatchConfig {
    /// Returns a copy with `ordered = false`.
    #[inline]
    pub fn unordered(mut self) -> Self {
        self.ordered = false;
        self
    }

    /// Returns a copy with `stop_on_first_error = false`.
    #[inline]
    pub fn collect_all(mut self) -> Self {
        self.stop_on_first_error = false;
        self
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for DispatchConfig {
    /// Default configuration:
    ///
    /// - `ordered = true`
    /// - `stop_on_first_error = true`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            ordered: true,
            stop_on_first_error: true,
            bus_capacity: 1024,
        }
    }
}
