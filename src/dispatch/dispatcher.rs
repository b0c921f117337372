//! # Long-lived dispatch entry point.
//!
//! [`Dispatcher`] holds default policies and, optionally, an event [`Bus`] that
//! every session it runs reports to. Build one with [`Dispatcher::builder`].
//!
//! ## Example
//! ```rust
//! use fanvisor::{DispatchConfig, Dispatcher, Subscriber};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = Dispatcher::builder()
//!     .with_config(DispatchConfig::default().collect_all())
//!     .with_event_bus()
//!     .build();
//! let mut events = dispatcher.bus().unwrap().subscribe();
//!
//! let subs: Vec<Subscriber<&'static str>> = vec![Subscriber::direct("noop", |_| Ok(()))];
//! dispatcher.dispatch(&subs, "demo", ()).await.unwrap();
//!
//! assert!(events.try_recv().is_ok());
//! # }
//! ```

use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::events::Bus;
use crate::subscribers::{Notification, Subscriber};

use super::coordinator::run_session;

/// Dispatch entry point with default policies and optional event reporting.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
    bus: Option<Bus>,
}

impl Dispatcher {
    /// Creates a dispatcher without an event bus.
    pub fn new(config: DispatchConfig) -> Self {
        Self { config, bus: None }
    }

    /// Starts building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Returns the default policies.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Returns the event bus, if one was configured.
    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref()
    }

    /// Dispatches with the default policies.
    pub async fn dispatch<S, P>(
        &self,
        subscribers: &[Subscriber<S, P>],
        sender: S,
        payload: P,
    ) -> Result<(), DispatchError>
    where
        S: Send + Sync + 'static,
        P: Send + Sync + 'static,
    {
        self.dispatch_with(subscribers, sender, payload, self.config)
            .await
    }

    /// Dispatches with explicit policies; events still go to this dispatcher's bus.
    pub async fn dispatch_with<S, P>(
        &self,
        subscribers: &[Subscriber<S, P>],
        sender: S,
        payload: P,
        config: DispatchConfig,
    ) -> Result<(), DispatchError>
    where
        S: Send + Sync + 'static,
        P: Send + Sync + 'static,
    {
        run_session(
            subscribers,
            Notification::new(sender, payload),
            config,
            self.bus.as_ref(),
        )
        .await
    }
}

/// Builder for constructing a [`Dispatcher`].
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    config: DispatchConfig,
    bus: Option<Bus>,
    with_events: bool,
}

impl DispatcherBuilder {
    /// Creates a builder with default policies and no event bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default policies.
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a fresh event bus sized by `DispatchConfig::bus_capacity`.
    pub fn with_event_bus(mut self) -> Self {
        self.with_events = true;
        self
    }

    /// Reports events to an existing bus (e.g. one shared by several dispatchers).
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> Dispatcher {
        let bus = match self.bus {
            Some(bus) => Some(bus),
            None if self.with_events => Some(Bus::new(self.config.bus_capacity_clamped())),
            None => None,
        };
        Dispatcher {
            config: self.config,
            bus,
        }
    }
}
