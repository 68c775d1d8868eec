/// hwserver error types
///
/// Errors surfaced by the runtime and the application layer.
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for hwserver operations
#[derive(Error, Debug)]
pub enum HwError {
    /// IO error during socket operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Protocol error during ZMTP handshake or framing
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Handshake did not finish in time
    #[error("Handshake timeout after {0:?}")]
    HandshakeTimeout(Duration),

    /// Invalid greeting received
    #[error("Invalid greeting: {0}")]
    InvalidGreeting(String),

    /// Invalid frame format
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Message too large
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HwError {
    /// Create a protocol error with a message
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create an invalid frame error
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error only ends the current peer session.
    ///
    /// A server keeps accepting new peers after these; anything else
    /// (listener failures, configuration) stops it.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Io(e) => !matches!(
                e.kind(),
                io::ErrorKind::AddrInUse
                    | io::ErrorKind::AddrNotAvailable
                    | io::ErrorKind::PermissionDenied
            ),
            Self::Protocol(_)
            | Self::HandshakeTimeout(_)
            | Self::InvalidGreeting(_)
            | Self::InvalidFrame(_)
            | Self::MessageTooLarge { .. } => true,
            Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_errors_are_connection_errors() {
        assert!(HwError::protocol("bad READY").is_connection_error());
        assert!(HwError::HandshakeTimeout(Duration::from_secs(1)).is_connection_error());
        assert!(HwError::MessageTooLarge { size: 10, max: 5 }.is_connection_error());
        assert!(HwError::from(io::Error::from(io::ErrorKind::ConnectionReset)).is_connection_error());
    }

    #[test]
    fn setup_errors_are_fatal() {
        assert!(!HwError::config("missing bind").is_connection_error());
        assert!(!HwError::from(io::Error::from(io::ErrorKind::AddrInUse)).is_connection_error());
    }

    #[test]
    fn display_includes_sizes() {
        let err = HwError::MessageTooLarge { size: 300, max: 256 };
        assert_eq!(err.to_string(), "Message too large: 300 bytes (max: 256)");
    }
}
