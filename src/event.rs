//! Inbound AMI events and their completion predicates.

use serde::ser::{Serialize, Serializer};

use crate::message::{Message, contains_ignore_ascii_case};

/// An asynchronous notification from the server.
///
/// Events are either standalone (channel state changes, registrations) or
/// correlated with an action via their `actionid` field, in which case a
/// terminal event closes the action's event list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    message: Message,
}

impl Event {
    /// Parse an event from one complete wire message.
    #[must_use]
    pub fn unmarshall(data: &str) -> Self {
        Self {
            message: Message::unmarshall(data),
        }
    }

    /// The event type name (the `Event` field).
    #[must_use]
    pub fn event_type(&self) -> Option<&str> { self.message.get("event") }

    /// Correlation id, present when this event was triggered by an action.
    #[must_use]
    pub fn action_id(&self) -> Option<&str> { self.message.get("actionid") }

    /// Event-list marker (`start`, `Complete`, ...), if any.
    #[must_use]
    pub fn eventlist(&self) -> Option<&str> { self.message.get("eventlist") }

    /// Look up any decoded field by its normalized name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> { self.message.get(name) }

    /// Access the underlying field mapping.
    #[must_use]
    pub fn message(&self) -> &Message { &self.message }

    /// Whether this event terminates a correlated event sequence.
    ///
    /// True when the event type contains `Complete` (for example
    /// `StatusComplete`, `PeerlistComplete`) or when the event-list marker
    /// says so, all case-insensitive.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.event_type()
            .is_some_and(|name| contains_ignore_ascii_case(name, "complete"))
            || self.eventlist_complete()
    }

    /// Whether the `EventList` field marks the end of an event list.
    ///
    /// Besides the usual `Complete` value, `DBGetResponse` is accepted: the
    /// DBGet command family terminates its list with that marker instead.
    /// A protocol quirk, kept as a named special case.
    #[must_use]
    pub fn eventlist_complete(&self) -> bool {
        self.eventlist().is_some_and(|value| {
            contains_ignore_ascii_case(value, "complete")
                || contains_ignore_ascii_case(value, "dbgetresponse")
        })
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.message.serialize(serializer)
    }
}
