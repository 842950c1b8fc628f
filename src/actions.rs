//! Catalog of standard AMI actions.
//!
//! Each command is a small data builder implementing
//! [`AmiAction`](crate::action::AmiAction); the session controller assigns
//! correlation ids, so none of these carry any. [`CustomAction`] covers the
//! long tail of manager commands that have no dedicated builder.

use crate::action::AmiAction;

/// Authenticate the session. Must be the first action on a new connection.
#[derive(Clone, Debug)]
pub struct Login {
    username: String,
    secret: String,
}

impl Login {
    /// Create a login action with the given credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl AmiAction for Login {
    fn name(&self) -> &str { "Login" }

    fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("Username".to_owned(), self.username.clone()),
            ("Secret".to_owned(), self.secret.clone()),
        ]
    }
}

/// End the manager session; the server replies and closes its side.
#[derive(Clone, Copy, Debug)]
pub struct Logoff;

impl AmiAction for Logoff {
    fn name(&self) -> &str { "Logoff" }
}

/// Keepalive; the server answers with a Pong response.
#[derive(Clone, Copy, Debug)]
pub struct Ping;

impl AmiAction for Ping {
    fn name(&self) -> &str { "Ping" }
}

/// Tear down an active channel.
#[derive(Clone, Debug)]
pub struct Hangup {
    channel: String,
    cause: Option<String>,
}

impl Hangup {
    /// Hang up `channel` with the default cause.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            cause: None,
        }
    }

    /// Set the numeric hangup cause (`16` normal clearing, `17` busy, ...).
    #[must_use]
    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl AmiAction for Hangup {
    fn name(&self) -> &str { "Hangup" }

    fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("Channel".to_owned(), self.channel.clone())];
        if let Some(cause) = &self.cause {
            fields.push(("Cause".to_owned(), cause.clone()));
        }
        fields
    }
}

/// Request channel status; without a channel, all channels are reported
/// as a correlated event list.
#[derive(Clone, Debug, Default)]
pub struct Status {
    channel: Option<String>,
    variables: Vec<String>,
    all_variables: Option<bool>,
}

impl Status {
    /// Status of all active channels.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Restrict the report to one channel.
    #[must_use]
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Request specific channel variables in the report.
    #[must_use]
    pub fn variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// Request every channel variable in the report.
    #[must_use]
    pub fn all_variables(mut self, all: bool) -> Self {
        self.all_variables = Some(all);
        self
    }
}

impl AmiAction for Status {
    fn name(&self) -> &str { "Status" }

    fn fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        if let Some(channel) = &self.channel {
            fields.push(("Channel".to_owned(), channel.clone()));
        }
        if !self.variables.is_empty() {
            fields.push(("Variables".to_owned(), self.variables.join(",")));
        }
        if let Some(all) = self.all_variables {
            fields.push(("AllVariables".to_owned(), all.to_string()));
        }
        fields
    }
}

/// List all active channels with per-channel detail events.
#[derive(Clone, Copy, Debug)]
pub struct CoreShowChannels;

impl AmiAction for CoreShowChannels {
    fn name(&self) -> &str { "CoreShowChannels" }
}

/// Any manager command, by name, with an explicit key/value overlay.
#[derive(Clone, Debug)]
pub struct CustomAction {
    name: String,
    params: Vec<(String, String)>,
}

impl CustomAction {
    /// Create an action with the given name and no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append one parameter field.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

impl AmiAction for CustomAction {
    fn name(&self) -> &str { &self.name }

    fn fields(&self) -> Vec<(String, String)> { self.params.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_carries_username_and_secret() {
        let login = Login::new("admin", "hunter2");

        assert_eq!(login.name(), "Login");
        assert_eq!(
            login.fields(),
            vec![
                ("Username".to_owned(), "admin".to_owned()),
                ("Secret".to_owned(), "hunter2".to_owned()),
            ]
        );
    }

    #[test]
    fn bare_actions_have_no_fields() {
        assert_eq!(Logoff.name(), "Logoff");
        assert!(Logoff.fields().is_empty());
        assert_eq!(Ping.name(), "Ping");
        assert!(Ping.fields().is_empty());
        assert_eq!(CoreShowChannels.name(), "CoreShowChannels");
        assert!(CoreShowChannels.fields().is_empty());
    }

    #[test]
    fn hangup_cause_is_optional() {
        assert_eq!(
            Hangup::new("SIP/100-1").fields(),
            vec![("Channel".to_owned(), "SIP/100-1".to_owned())]
        );
        assert_eq!(
            Hangup::new("SIP/100-1").cause("16").fields(),
            vec![
                ("Channel".to_owned(), "SIP/100-1".to_owned()),
                ("Cause".to_owned(), "16".to_owned()),
            ]
        );
    }

    #[test]
    fn status_joins_variables_with_commas() {
        let status = Status::new()
            .channel("SIP/100-1")
            .variables(["CALLERID", "CHANNEL"])
            .all_variables(false);

        assert_eq!(
            status.fields(),
            vec![
                ("Channel".to_owned(), "SIP/100-1".to_owned()),
                ("Variables".to_owned(), "CALLERID,CHANNEL".to_owned()),
                ("AllVariables".to_owned(), "false".to_owned()),
            ]
        );
    }

    #[test]
    fn bare_status_requests_everything() {
        assert!(Status::new().fields().is_empty());
    }

    #[test]
    fn custom_action_overlays_params_in_order() {
        let action = CustomAction::new("QueueStatus").param("Queue", "support");

        assert_eq!(action.name(), "QueueStatus");
        assert_eq!(
            action.fields(),
            vec![("Queue".to_owned(), "support".to_owned())]
        );
    }
}
