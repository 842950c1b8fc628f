//! Configuration for AMI sessions.

use std::time::Duration;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Connection parameters for one AMI session.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use amiwire::AmiConfig;
///
/// let config = AmiConfig::new("pbx.example.net", 5038, "admin", "secret")
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct AmiConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) username: String,
    pub(crate) secret: String,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) channel_capacity: usize,
}

impl AmiConfig {
    /// Create a configuration for the given endpoint and credentials.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            secret: secret.into(),
            connect_timeout: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Bound the TCP connection attempt. Unset means the OS default.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Capacity of the signal and event broadcast channels.
    ///
    /// Slow subscribers that fall more than this many messages behind lose
    /// the oldest ones.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// The configured host.
    #[must_use]
    pub fn host(&self) -> &str { &self.host }

    /// The configured port.
    #[must_use]
    pub fn port(&self) -> u16 { self.port }
}
