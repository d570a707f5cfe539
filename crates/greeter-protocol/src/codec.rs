//! Protobuf encoding of individual messages.
//!
//! Pure transformations with no I/O. Framing lives in a separate module.

use prost::Message;

use crate::error::ProtocolResult;

/// Encodes a message into its protobuf bytes.
///
/// Output is deterministic for a given input. Fields holding their default
/// value (such as an empty string) are omitted.
pub fn encode<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

/// Decodes a message of type `M` from protobuf bytes.
///
/// Absent fields take their default value. Bytes that are not a valid
/// encoding of `M` fail with [`ProtocolError::MalformedMessage`].
///
/// [`ProtocolError::MalformedMessage`]: crate::ProtocolError::MalformedMessage
pub fn decode<M: Message + Default>(bytes: &[u8]) -> ProtocolResult<M> {
    Ok(M::decode(bytes)?)
}
