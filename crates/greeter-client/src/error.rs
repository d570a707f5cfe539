//! Client error types.

use std::time::Duration;

use thiserror::Error;

use greeter_protocol::{Code, ProtocolError};
use greeter_server::ServerError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint could not be reached or refused the connection.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// No reply arrived within the call timeout.
    #[error("deadline exceeded after {}ms", .0.as_millis())]
    DeadlineExceeded(Duration),

    /// The server closed the connection before replying.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// A message could not be decoded, on either side.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The server answered with a non-OK status.
    #[error("server returned {code}: {detail}")]
    Status { code: Code, detail: String },

    /// Protocol/framing error.
    #[error("protocol error: {0}")]
    Protocol(#[source] ProtocolError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Server error when running the `serve` command.
    #[error("server error: {0}")]
    Server(#[from] ServerError),
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::MalformedMessage(e) => Self::MalformedMessage(e.to_string()),
            e if e.is_connection_closed() => Self::ConnectionClosed,
            e => Self::Protocol(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_map_to_call_errors() {
        let closed = ProtocolError::IncompleteMessage {
            expected: 4,
            received: 1,
        };
        assert!(matches!(ClientError::from(closed), ClientError::ConnectionClosed));

        let reset = ProtocolError::Io(std::io::ErrorKind::ConnectionReset.into());
        assert!(matches!(ClientError::from(reset), ClientError::ConnectionClosed));

        let too_large = ProtocolError::MessageTooLarge { size: 10, max: 5 };
        assert!(matches!(ClientError::from(too_large), ClientError::Protocol(_)));
    }

    #[test]
    fn protocol_error_keeps_its_cause() {
        use std::error::Error;

        let err = ClientError::from(ProtocolError::MessageTooLarge { size: 10, max: 5 });
        let source = err.source().expect("protocol error should expose its cause");
        assert!(source.downcast_ref::<ProtocolError>().is_some());
    }

    #[test]
    fn display_messages() {
        let err = ClientError::DeadlineExceeded(Duration::from_secs(1));
        assert_eq!(err.to_string(), "deadline exceeded after 1000ms");

        let err = ClientError::Status {
            code: Code::Unimplemented,
            detail: "unknown method /x".into(),
        };
        assert_eq!(err.to_string(), "server returned UNIMPLEMENTED: unknown method /x");
    }
}
