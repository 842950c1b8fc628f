//! Observable session lifecycle signals.

/// Lifecycle notifications broadcast by [`AmiClient`](super::AmiClient).
///
/// Subscribers receive these in emission order. They mirror the session's
/// externally observable transitions; errors that a caller triggered
/// directly are additionally returned from the failing call itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSignal {
    /// The TCP connection was established.
    Connected,
    /// Authentication succeeded; the session is ready for actions.
    Ready,
    /// The server rejected the login credentials. The transport stays open.
    LoginRejected,
    /// The greeting did not identify an AMI endpoint. The transport stays
    /// open and no protocol traffic is processed.
    InvalidPeer {
        /// The greeting line as received.
        greeting: String,
    },
    /// The receive buffer exceeded its ceiling; buffered state was
    /// discarded and the transport torn down.
    Desynchronized,
    /// The transport failed while reading.
    TransportError {
        /// Human-readable error description.
        message: String,
    },
    /// The peer ended its side of the stream.
    Ended,
    /// The session is fully torn down.
    Closed {
        /// Whether teardown was caused by a fault rather than a clean close.
        had_error: bool,
    },
}
