#![doc(html_root_url = "https://docs.rs/amiwire/latest")]
//! Public API for the `amiwire` library.
//!
//! This crate provides an asynchronous client engine for the Asterisk
//! Manager Interface (AMI): message framing and codecs, action/response
//! correlation, and a session controller driving the TCP transport.

pub mod action;
pub mod actions;
pub mod classify;
pub mod client;
pub mod codec;
pub mod correlation;
pub mod error;
/// Result type alias re-exported for convenience when working with the
/// session controller.
pub use error::Result;
pub mod event;
pub mod message;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod response;
pub mod rewind_stream;

pub use action::{Action, AmiAction};
pub use classify::ServerMessage;
pub use client::{AmiClient, AmiConfig, SessionSignal};
pub use codec::{AmiCodec, FramingError, MAX_BUFFER_SIZE};
pub use correlation::{CorrelationTable, EventDisposition, ResponseCallback};
pub use error::AmiError;
pub use event::Event;
pub use message::Message;
pub use response::Response;
pub use rewind_stream::RewindStream;
