//! Outbound AMI actions.
//!
//! Concrete commands implement the [`AmiAction`] capability (a name plus
//! optional fields); the session controller stamps each send with a unique
//! correlation id and builds the final [`Action`] message from it. There is
//! no id state here: the generator lives with the session so that ids stay
//! monotonic per connection owner and deterministic under test.

use crate::message::Message;

/// A command that can be sent to the server.
///
/// Implementors are plain data builders: a fixed action name and the fields
/// it carries. The catalog of standard commands lives in
/// [`actions`](crate::actions); anything not covered there can be expressed
/// with [`CustomAction`](crate::actions::CustomAction).
pub trait AmiAction {
    /// The AMI action name (`Login`, `Ping`, `Status`, ...).
    fn name(&self) -> &str;

    /// Action-specific fields in the order they should appear on the wire.
    fn fields(&self) -> Vec<(String, String)> { Vec::new() }
}

/// A fully-built outbound message with its correlation id stamped.
///
/// The `ActionID` field is set before the `Action` name so it marshals
/// first, matching the order responses echo it back in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    id: u64,
    message: Message,
}

impl Action {
    /// Build the wire message for `command` under the correlation id `id`.
    #[must_use]
    pub fn build<A: AmiAction + ?Sized>(id: u64, command: &A) -> Self {
        let mut message = Message::new();
        message.set("ActionID", id.to_string());
        message.set("Action", command.name());
        for (name, value) in command.fields() {
            message.set(name, value);
        }
        Self { id, message }
    }

    /// The correlation id stamped on this action.
    #[must_use]
    pub fn action_id(&self) -> u64 { self.id }

    /// Attach a channel variable (`Variable: key=value` line).
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.message.set_variable(key, value);
    }

    /// Serialize to AMI wire text, terminated by the message delimiter.
    #[must_use]
    pub fn marshall(&self) -> String { self.message.marshall() }

    /// Access the underlying field mapping.
    #[must_use]
    pub fn message(&self) -> &Message { &self.message }
}
