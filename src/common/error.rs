//! Error types for the IPC client and daemon side
//!
//! Error messages are meant to be shown to whoever runs the CLI, with hints
//! on how to resolve common issues. The library never retries on its own;
//! every failure is returned to the caller.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ipc-link
#[derive(Error, Debug)]
pub enum Error {
    // === Connection Errors ===
    #[error("Daemon not running: nothing is listening at {address}. Start the daemon first")]
    DaemonNotRunning { address: String },

    #[error("Failed to connect to {address}: {source}")]
    ConnectionFailed {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid application name '{0}': must be non-empty and contain no path separators")]
    InvalidAppName(String),

    // === Exchange Errors ===
    #[error("Failed to write request: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to read response: {0}")]
    Read(#[source] io::Error),

    #[error("Daemon closed the connection before replying")]
    ConnectionClosed,

    #[error("Malformed payload: {0}")]
    MalformedResponse(String),

    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    #[error("Failed to encode payload: {0}")]
    Encode(String),

    #[error("Frame of {len} bytes exceeds the maximum of {max} bytes")]
    FrameTooLarge { len: usize, max: u32 },

    #[error("No response within {0:?}. The connection can no longer be used")]
    Timeout(Duration),

    #[error("Connection is no longer usable after an earlier failure. Reconnect to continue")]
    ConnectionBroken,

    // === Daemon Errors ===
    #[error("Failed to listen at {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify a failed connection attempt
    ///
    /// A missing endpoint or a refused connection means nobody is serving the
    /// address; anything else is reported with the underlying cause.
    pub fn connect_failed(address: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => Self::DaemonNotRunning {
                address: address.to_string(),
            },
            _ => Self::ConnectionFailed {
                address: address.to_string(),
                source,
            },
        }
    }

    /// Whether this error happened while establishing the connection
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::DaemonNotRunning { .. } | Self::ConnectionFailed { .. }
        )
    }

    /// Whether the connection must be discarded after this error
    ///
    /// A malformed payload arrives in a complete frame, so the stream is still
    /// positioned at the next frame boundary. Everything that fails mid-frame
    /// leaves the stream in an unknown state.
    pub fn poisons_connection(&self) -> bool {
        matches!(
            self,
            Self::Write(_)
                | Self::Read(_)
                | Self::ConnectionClosed
                | Self::Timeout(_)
                | Self::ConnectionBroken
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_daemon_not_running() {
        let err = Error::connect_failed(
            "/tmp/app.sock",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(matches!(err, Error::DaemonNotRunning { ref address } if address == "/tmp/app.sock"));
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_refused_is_daemon_not_running() {
        let err = Error::connect_failed(
            "/tmp/app.sock",
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert!(matches!(err, Error::DaemonNotRunning { .. }));
    }

    #[test]
    fn test_other_connect_failure_keeps_source() {
        let err = Error::connect_failed(
            "/tmp/app.sock",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, Error::ConnectionFailed { .. }));
        assert!(err.is_connection_error());
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_malformed_response_keeps_connection() {
        assert!(!Error::MalformedResponse("bad".into()).poisons_connection());
        assert!(Error::Timeout(Duration::from_secs(1)).poisons_connection());
        assert!(Error::Write(io::Error::from(io::ErrorKind::BrokenPipe)).poisons_connection());
    }
}
