//! Inbound AMI responses.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    event::Event,
    message::{Message, contains_ignore_ascii_case},
};

/// The reply to exactly one action.
///
/// A response either resolves its action immediately or, when deferred,
/// aggregates the correlated events that follow until a terminal event
/// closes the list. The `events` sequence is append-only and stays empty
/// for immediate responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    message: Message,
    events: Vec<Event>,
}

impl Response {
    /// Parse a response from one complete wire message.
    #[must_use]
    pub fn unmarshall(data: &str) -> Self {
        Self {
            message: Message::unmarshall(data),
            events: Vec::new(),
        }
    }

    /// Placeholder aggregation target used while an action is in flight.
    pub(crate) fn empty() -> Self {
        Self {
            message: Message::new(),
            events: Vec::new(),
        }
    }

    /// The status field (`Success`, `Error`, `Follows`, ...).
    #[must_use]
    pub fn status(&self) -> Option<&str> { self.message.get("response") }

    /// Correlation id of the action this response answers.
    #[must_use]
    pub fn action_id(&self) -> Option<&str> { self.message.get("actionid") }

    /// Free-text detail accompanying the status, if any.
    #[must_use]
    pub fn message_text(&self) -> Option<&str> { self.message.get("message") }

    /// Look up any decoded field by its normalized name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> { self.message.get(name) }

    /// Access the underlying field mapping.
    #[must_use]
    pub fn message(&self) -> &Message { &self.message }

    /// Correlated events aggregated onto this response, in arrival order.
    #[must_use]
    pub fn events(&self) -> &[Event] { &self.events }

    pub(crate) fn push_event(&mut self, event: Event) { self.events.push(event); }

    /// Whether the server reported success.
    #[must_use]
    pub fn is_success(&self) -> bool { self.status() == Some("Success") }

    /// Whether correlated events will follow before the action resolves.
    ///
    /// The protocol signals this in prose: a `Message` field containing
    /// `follow` (case-insensitive), as in `"Channel status will follow"`.
    /// No `Message` field means nothing follows.
    #[must_use]
    pub fn will_follow(&self) -> bool {
        self.message_text()
            .is_some_and(|text| contains_ignore_ascii_case(text, "follow"))
    }
}

/// Serializes the plain fields plus the aggregated `events` array.
impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.message.field_count() + 1))?;
        for (name, value) in self.message.fields() {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("events", &self.events)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn decodes_the_documented_success_scenario() {
        let response =
            Response::unmarshall("Response: Success\r\nActionID: 42\r\nMessage: Command executed\r\n\r\n");

        assert_eq!(response.status(), Some("Success"));
        assert_eq!(response.action_id(), Some("42"));
        assert_eq!(response.message_text(), Some("Command executed"));
        assert!(response.events().is_empty());
        assert!(response.is_success());
        assert!(!response.will_follow());
    }

    #[rstest]
    #[case("Response: Success\r\nMessage: Channel status will follow\r\n\r\n", true)]
    #[case("Response: Success\r\nMessage: Parked calls will FOLLOW\r\n\r\n", true)]
    #[case("Response: Success\r\nMessage: Command executed\r\n\r\n", false)]
    #[case("Response: Success\r\n\r\n", false)]
    fn deferral_depends_on_the_message_text(#[case] data: &str, #[case] deferred: bool) {
        assert_eq!(Response::unmarshall(data).will_follow(), deferred);
    }

    #[rstest]
    #[case("Response: Error\r\nMessage: Authentication failed\r\n\r\n", false)]
    #[case("Response: success\r\n\r\n", false)]
    #[case("Response: Success\r\n\r\n", true)]
    fn success_requires_the_exact_status(#[case] data: &str, #[case] success: bool) {
        assert_eq!(Response::unmarshall(data).is_success(), success);
    }

    #[test]
    fn serde_view_includes_aggregated_events() {
        let mut response = Response::unmarshall("Response: Success\r\nActionID: 9\r\n\r\n");
        response.push_event(Event::unmarshall("Event: Status\r\nActionID: 9\r\n\r\n"));

        let json = serde_json::to_value(&response).expect("serialize response");

        assert_eq!(
            json,
            serde_json::json!({
                "response": "Success",
                "actionid": "9",
                "events": [{"event": "Status", "actionid": "9"}],
            })
        );
    }
}
