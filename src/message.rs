//! AMI message representation and text codec.
//!
//! A [`Message`] is an insertion-ordered bag of `name: value` fields plus a
//! separate map of channel variables carried on `Variable: key=value` lines.
//! It marshals to and from the CRLF-delimited AMI wire text and is the base
//! representation shared by actions, responses, and events.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Line terminator used between fields of one message.
pub const EOL: &str = "\r\n";

/// Case-insensitive substring search.
///
/// `needle` must already be lower-case; the classification predicates only
/// ever pass lower-case literals.
pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}

/// An AMI protocol message: ordered plain fields plus channel variables.
///
/// Field names are case-insensitive on the wire. [`Message::unmarshall`]
/// normalizes them to lower-case with `-` replaced by `_`, so decoded
/// messages are queried with normalized names (`"actionid"`, not
/// `"ActionID"`). Outbound messages keep the names exactly as set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    fields: Vec<(String, String)>,
    variables: Vec<(String, String)>,
}

impl Message {
    /// Create an empty message.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set a plain field, overwriting any previous value for the same name.
    ///
    /// Insertion order is preserved and determines marshalling order.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            entry.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Look up a plain field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a channel variable, overwriting any previous value for the key.
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.variables.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = value;
        } else {
            self.variables.push((key, value));
        }
    }

    /// Look up a channel variable by key.
    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over the plain fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Iterate over the channel variables in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of plain fields.
    #[must_use]
    pub fn field_count(&self) -> usize { self.fields.len() }

    /// Serialize the message into AMI wire text.
    ///
    /// Plain fields are emitted as `Name: value` lines in insertion order,
    /// followed by one `Variable: key=value` line per variable. The text
    /// always ends with a blank line (`\r\n\r\n`), the protocol's message
    /// delimiter.
    #[must_use]
    pub fn marshall(&self) -> String {
        let mut parts = Vec::with_capacity(self.fields.len() + self.variables.len());
        for (name, value) in &self.fields {
            parts.push(format!("{name}: {value}"));
        }
        for (key, value) in &self.variables {
            parts.push(format!("Variable: {key}={value}"));
        }
        let mut text = parts.join(EOL);
        text.push_str(EOL);
        text.push_str(EOL);
        text
    }

    /// Parse one complete wire message (without its trailing blank line).
    ///
    /// Lines split on every `:`; the first segment is the field name and the
    /// remaining segments are rejoined with `:` as the value. AMI has no
    /// escape character, so a value legitimately containing colons (command
    /// listings, say) cannot be told apart from a literal colon in a short
    /// field. The greedy rejoin is a documented protocol limitation.
    ///
    /// Field names are trimmed, lower-cased, and `-` becomes `_`. A line
    /// whose normalized name contains `variable` and whose value contains
    /// `=` populates the variables map instead; an empty right-hand side is
    /// dropped (SetVar carries a `Variable:` header whose value has no `=`
    /// payload worth keeping).
    #[must_use]
    pub fn unmarshall(data: &str) -> Self {
        let mut message = Self::new();

        for raw_line in data.split(EOL) {
            if raw_line.trim().is_empty() {
                continue;
            }

            let mut segments = raw_line.split(':');
            let Some(name) = segments.next() else { continue };
            let value = segments.collect::<Vec<_>>().join(":");

            let name = name.trim().replace('-', "_").to_lowercase();
            let value = value.trim();

            if name.contains("variable") && value.contains('=') {
                if let Some((key, variable_value)) = value.split_once('=') {
                    if !variable_value.is_empty() {
                        message.set_variable(key, variable_value);
                    }
                }
            } else {
                message.set(name, value);
            }
        }

        message
    }
}

/// Serializes the plain fields as a map, mirroring the wire field order.
///
/// Channel variables are deliberately excluded from this view.
impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
