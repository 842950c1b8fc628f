//! Classification of raw decoded messages.
//!
//! The server gives no framing-level type tag; the only reliable signal is
//! the leading field of the message text. Anything that opens with neither
//! `Event: ` nor `Response: ` is unclassifiable and the caller logs and
//! drops it rather than failing the session.

use crate::{event::Event, response::Response};

/// A classified inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerMessage {
    /// Reply correlated to a sent action.
    Response(Response),
    /// Unsolicited or correlated notification.
    Event(Event),
}

impl ServerMessage {
    /// Classify a raw message by its leading line.
    ///
    /// Returns `None` for unclassifiable input; per the protocol's loose
    /// framing guarantees that is expected noise, not an error.
    #[must_use]
    pub fn classify(raw: &str) -> Option<Self> {
        if raw.starts_with("Event: ") {
            return Some(Self::Event(Event::unmarshall(raw)));
        }
        if raw.starts_with("Response: ") {
            return Some(Self::Response(Response::unmarshall(raw)));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_event_field_classifies_as_event() {
        let classified = ServerMessage::classify("Event: Hangup\r\nChannel: SIP/100\r\n\r\n");

        let Some(ServerMessage::Event(event)) = classified else {
            panic!("expected an event");
        };
        assert_eq!(event.event_type(), Some("Hangup"));
    }

    #[test]
    fn leading_response_field_classifies_as_response() {
        let classified = ServerMessage::classify("Response: Success\r\nActionID: 1\r\n\r\n");

        let Some(ServerMessage::Response(response)) = classified else {
            panic!("expected a response");
        };
        assert!(response.is_success());
    }

    #[test]
    fn only_the_leading_line_counts() {
        // An Event field buried past the first line does not classify.
        assert!(ServerMessage::classify("Junk: 1\r\nEvent: Hangup\r\n\r\n").is_none());
        assert!(ServerMessage::classify("Asterisk Call Manager/5.0").is_none());
        assert!(ServerMessage::classify("").is_none());
    }
}
