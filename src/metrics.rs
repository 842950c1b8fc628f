//! Metric helpers for `amiwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate.

use metrics::{counter, gauge};

/// Name of the gauge tracking active sessions.
pub const SESSIONS_ACTIVE: &str = "amiwire_sessions_active";
/// Name of the counter tracking processed protocol messages.
pub const MESSAGES_PROCESSED: &str = "amiwire_messages_processed_total";
/// Name of the counter tracking error occurrences.
pub const ERRORS_TOTAL: &str = "amiwire_errors_total";

/// Direction of message processing.
#[derive(Clone, Copy)]
pub enum Direction {
    /// Inbound messages received from the server.
    Inbound,
    /// Outbound actions sent to the server.
    Outbound,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Increment the active sessions gauge.
pub fn inc_sessions() { gauge!(SESSIONS_ACTIVE).increment(1.0); }

/// Decrement the active sessions gauge.
pub fn dec_sessions() { gauge!(SESSIONS_ACTIVE).decrement(1.0); }

/// Record a processed message for the given direction.
pub fn inc_messages(direction: Direction) {
    counter!(MESSAGES_PROCESSED, "direction" => direction.as_str()).increment(1);
}

/// Record an error occurrence.
pub fn inc_errors() { counter!(ERRORS_TOTAL).increment(1); }
