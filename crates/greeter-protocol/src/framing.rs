//! Length-prefixed message framing.
//!
//! Messages are framed with a 4-byte big-endian length prefix followed by
//! the protobuf payload:
//!
//! ```text
//! +----------------+--------------------+
//! | length (4 BE)  |  protobuf payload  |
//! +----------------+--------------------+
//! ```

use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Encodes a message to bytes with length prefix.
///
/// Returns the complete framed message ready for transmission. A message
/// whose fields all hold their defaults encodes to nothing and fails with
/// [`ProtocolError::EmptyMessage`], matching what [`read_message`] accepts.
///
/// # Example
///
/// ```rust
/// use greeter_protocol::{encode_message, Invocation};
///
/// let invocation = Invocation::new("/helloworld.Greeter/SayHello", Vec::new(), None);
/// let bytes = encode_message(&invocation).unwrap();
/// assert!(bytes.len() > 4);
/// ```
pub fn encode_message<M: Message>(message: &M) -> ProtocolResult<Vec<u8>> {
    let len = check_len(message.encoded_len())?;
    if len == 0 {
        return Err(ProtocolError::EmptyMessage);
    }

    let mut buffer = Vec::with_capacity(4 + len as usize);
    buffer.extend_from_slice(&len.to_be_bytes());
    message.encode_raw(&mut buffer);
    Ok(buffer)
}

/// Decodes a message from bytes with length prefix.
///
/// The input should be a complete framed message (length prefix + payload).
pub fn decode_message<M: Message + Default>(data: &[u8]) -> ProtocolResult<M> {
    if data.len() < 4 {
        return Err(ProtocolError::IncompleteMessage {
            expected: 4,
            received: data.len(),
        });
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&data[0..4]);
    let len = check_len(u32::from_be_bytes(len_bytes) as usize)? as usize;
    if len == 0 {
        return Err(ProtocolError::EmptyMessage);
    }

    if data.len() < 4 + len {
        return Err(ProtocolError::IncompleteMessage {
            expected: 4 + len,
            received: data.len(),
        });
    }

    Ok(M::decode(&data[4..4 + len])?)
}

/// Reads a single framed message from an async stream.
///
/// Returns `Ok(None)` if the stream ends before any byte of the frame.
/// A stream that ends mid-frame is an error.
pub async fn read_message<M, R>(reader: &mut R) -> ProtocolResult<Option<M>>
where
    M: Message + Default,
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = reader.read(&mut len_buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(ProtocolError::IncompleteMessage {
                expected: 4,
                received: filled,
            });
        }
        filled += n;
    }

    let len = check_len(u32::from_be_bytes(len_buf) as usize)? as usize;
    if len == 0 {
        return Err(ProtocolError::EmptyMessage);
    }

    let mut payload = vec![0u8; len];
    match reader.read_exact(&mut payload).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::IncompleteMessage {
                expected: 4 + len,
                received: 4,
            });
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Some(M::decode(payload.as_slice())?))
}

/// Writes a single framed message to an async stream and flushes it.
pub async fn write_message<M, W>(writer: &mut W, message: &M) -> ProtocolResult<()>
where
    M: Message,
    W: AsyncWrite + Unpin,
{
    let data = encode_message(message)?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

fn check_len(len: usize) -> ProtocolResult<u32> {
    if len > MAX_MESSAGE_SIZE as usize {
        return Err(ProtocolError::MessageTooLarge {
            size: u32::try_from(len).unwrap_or(u32::MAX),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(len as u32)
}
