//! Session configuration.

use std::time::Duration;

/// Default kmud host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default kmud port.
pub const DEFAULT_PORT: u16 = 8945;

/// Configuration for a dialogue session.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use mudbot::SessionConfig;
///
/// let config = SessionConfig::new("mud.example.org")
///     .port(4000)
///     .timeout(Duration::from_secs(10));
/// assert_eq!(config.socket_addr(), "mud.example.org:4000");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Target port (default: 8945).
    pub port: u16,

    /// Deadline for each wait on the server (default: 5 seconds).
    pub timeout: Duration,

    /// Deadline for establishing the connection (default: 10 seconds).
    pub connect_timeout: Duration,

    /// Terminator appended to every line sent (default: CRLF).
    pub line_ending: String,

    /// Maximum unconsumed output retained for matching, in bytes.
    pub search_depth: usize,
}

impl SessionConfig {
    /// Create a configuration for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Set the server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the per-wait deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the TCP connect deadline.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the terminator appended to every sent line.
    pub fn line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }

    /// Set the maximum unconsumed output retained.
    pub fn search_depth(mut self, search_depth: usize) -> Self {
        self.search_depth = search_depth;
        self
    }

    /// Get the socket address for logging.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            line_ending: "\r\n".to_string(),
            search_depth: 4096,
        }
    }
}
