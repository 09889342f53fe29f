//! Error types for mudbot.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for mudbot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// TCP transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Dialogue session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// True when the remote end closed the stream.
    ///
    /// Flows treat this as a clean stop rather than a failure.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Session(SessionError::Closed))
    }
}

/// Transport layer errors (connecting, raw socket I/O).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Connect did not complete in time
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error on an established connection
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Session layer errors (pattern waiting, stream state).
#[derive(Error, Debug)]
pub enum SessionError {
    /// Remote end closed the stream
    #[error("Stream closed by remote")]
    Closed,

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Configuration errors, raised before any stream is opened.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An argument failed validation
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Result type alias using mudbot's Error.
pub type Result<T> = std::result::Result<T, Error>;
