//! Protocol error types.

use std::io;

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding, decoding or moving frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame length above [`MAX_MESSAGE_SIZE`](crate::MAX_MESSAGE_SIZE).
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: u32, max: u32 },

    /// Bytes are not a valid protobuf encoding of the expected message.
    #[error("malformed message: {0}")]
    MalformedMessage(#[from] prost::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended part-way through a frame.
    #[error("stream ended mid-frame: expected {expected} bytes, got {received}")]
    IncompleteMessage { expected: usize, received: usize },

    /// A frame announced a zero-length body.
    #[error("zero-length frame")]
    EmptyMessage,

    #[error("timed out during {operation}")]
    Timeout { operation: String },
}

impl ProtocolError {
    /// Returns true if the error means the peer went away.
    pub fn is_connection_closed(&self) -> bool {
        match self {
            Self::IncompleteMessage { .. } => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
