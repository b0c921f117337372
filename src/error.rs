//! Error types used by the dispatch engine and its subscribers.
//!
//! This module defines:
//!
//! - [`SubscriberError`] — the outcome of a single failed subscriber.
//! - [`Fault`] — a [`SubscriberError`] tagged with the subscriber that produced it.
//! - [`DispatchError`] — what a dispatch session settles with when anything faulted.
//!
//! The enums provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// # Errors produced by a single subscriber.
///
/// Returned explicitly by the subscriber body, or synthesized by the engine when
/// the subscriber panicked or its background task vanished before reporting.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriberError {
    /// The subscriber returned an error.
    #[error("subscriber failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The subscriber panicked; the panic was caught at the subscriber boundary.
    #[error("subscriber panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The subscriber's background task was dropped before it reported an outcome.
    #[error("subscriber abandoned before completion")]
    Abandoned,
}

impl SubscriberError {
    /// Shorthand for [`SubscriberError::Fail`].
    ///
    /// # Example
    /// ```
    /// use fanvisor::SubscriberError;
    ///
    /// let err = SubscriberError::fail("boom");
    /// assert_eq!(err.to_string(), "subscriber failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        SubscriberError::Fail {
            error: error.into(),
        }
    }

    /// Converts a caught panic payload into [`SubscriberError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        SubscriberError::Panicked { info }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscriberError::Fail { .. } => "subscriber_failed",
            SubscriberError::Panicked { .. } => "subscriber_panicked",
            SubscriberError::Abandoned => "subscriber_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscriberError::Fail { error } => format!("error: {error}"),
            SubscriberError::Panicked { info } => format!("panic: {info}"),
            SubscriberError::Abandoned => "abandoned".to_string(),
        }
    }
}

/// A subscriber error together with the subscriber that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Name of the faulted subscriber.
    pub subscriber: Arc<str>,
    /// Position of the subscriber in the dispatched snapshot.
    pub index: usize,
    /// What went wrong.
    pub error: SubscriberError,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}: {}", self.subscriber, self.index, self.error)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// # Errors a dispatch session settles with.
///
/// Exactly one captured fault is surfaced as-is; two or more are wrapped in
/// [`DispatchError::Aggregate`] in the order they were captured.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A single subscriber faulted.
    #[error(transparent)]
    Fault(Fault),

    /// Several subscribers faulted.
    #[error("{} subscribers faulted", faults.len())]
    Aggregate {
        /// Every captured fault, in capture order.
        faults: Vec<Fault>,
    },
}

impl DispatchError {
    /// Builds the settlement error for a non-empty fault list.
    ///
    /// Returns `None` when `faults` is empty.
    pub(crate) fn from_faults(mut faults: Vec<Fault>) -> Option<Self> {
        match faults.len() {
            0 => None,
            1 => faults.pop().map(DispatchError::Fault),
            _ => Some(DispatchError::Aggregate { faults }),
        }
    }

    /// Returns the captured faults in capture order.
    ///
    /// # Example
    /// ```
    /// use fanvisor::{DispatchError, Fault, SubscriberError};
    ///
    /// let err = DispatchError::Fault(Fault {
    ///     subscriber: "audit".into(),
    ///     index: 0,
    ///     error: SubscriberError::fail("E"),
    /// });
    /// assert_eq!(err.faults().len(), 1);
    /// assert_eq!(err.as_label(), "dispatch_fault");
    /// ```
    pub fn faults(&self) -> &[Fault] {
        match self {
            DispatchError::Fault(fault) => std::slice::from_ref(fault),
            DispatchError::Aggregate { faults } => faults,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Fault(_) => "dispatch_fault",
            DispatchError::Aggregate { .. } => "dispatch_aggregate",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Fault(fault) => format!("fault: {fault}"),
            DispatchError::Aggregate { faults } => {
                let parts: Vec<String> = faults.iter().map(ToString::to_string).collect();
                format!("aggregate: [{}]", parts.join("; "))
            }
        }
    }
}
