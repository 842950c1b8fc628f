//! Error types for AMI sessions.

use std::io;

/// Errors emitted by [`crate::AmiClient`] and delivered to pending
/// correlation callbacks.
#[derive(Debug, thiserror::Error)]
pub enum AmiError {
    /// Transport or codec error.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// The connection attempt did not complete within the configured limit.
    #[error("connection attempt timed out")]
    ConnectTimeout,
    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Disconnected,
    /// The initial greeting did not identify an AMI endpoint. The transport
    /// is left open; closing is the caller's decision.
    #[error("unrecognized peer greeting: {greeting:?}")]
    UnrecognizedPeer {
        /// The greeting line (or its oversized prefix) as received.
        greeting: String,
    },
    /// The server rejected the login credentials. The session stays
    /// connected but unauthenticated.
    #[error("authentication rejected by server")]
    LoginRejected,
    /// The receive buffer exceeded its ceiling without a message delimiter;
    /// all buffered state was discarded and the transport torn down.
    #[error("receive stream desynchronized")]
    Desynchronized,
    /// An action was sent while the session was not connected.
    #[error("not connected")]
    NotConnected,
    /// The session was torn down before this action's response arrived.
    #[error("session closed before a response arrived")]
    SessionClosed,
}

/// Convenience alias for results carrying [`AmiError`].
pub type Result<T> = std::result::Result<T, AmiError>;
