//! Session controller for AMI connections.
//!
//! [`AmiClient`] owns the transport lifecycle: it connects, validates the
//! server greeting, authenticates, and then drives the inbound pipeline
//! (framer, codec, classifier, correlation table) from a background reader
//! task. Callers send actions and await correlated responses; standalone
//! events and session signals arrive on broadcast channels.

mod config;
mod dispatch;
mod greeting;
mod runtime;
mod signal;

pub use config::AmiConfig;
pub use runtime::AmiClient;
pub use signal::SessionSignal;
