//! Server error types.

use std::io;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors returned by the server handle and its connections.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening endpoint could not be claimed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Socket failure on an accepted connection.
    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A frame or envelope could not be read or written.
    #[error("protocol error: {0}")]
    Protocol(#[from] greeter_protocol::ProtocolError),

    /// Settings the server cannot run with.
    #[error("invalid server configuration: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Wraps a failure to claim `addr`.
    pub fn bind(addr: impl Into<String>, source: io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Rejects a setting.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
