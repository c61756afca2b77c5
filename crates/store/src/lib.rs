//! FluxRadar store: in-RAM resource registry and "registry changed" notifier.

#![forbid(unsafe_code)]

pub mod demo;
mod notify;
mod registry;

pub use notify::{Notifier, Subscription};
pub use registry::Registry;
