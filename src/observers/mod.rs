//! Event observers: the [`Observer`] trait, the [`observe`] worker and the
//! optional stdout [`LogWriter`].

#[cfg(feature = "logging")]
mod log;
mod observer;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::{Observer, observe};
