//! Message schema, wire codec and framing for the greeter service.
//!
//! This crate defines the protocol spoken between the greeter client and
//! server over a plain TCP stream.
//!
//! # Protocol Overview
//!
//! Every message on the wire is a length-prefixed protobuf record:
//! - 4 bytes: message length (u32, big-endian)
//! - N bytes: protobuf-encoded envelope
//!
//! # Envelope Structure
//!
//! The client sends an [`Invocation`] carrying:
//! - `request_id`: UUID for request/response correlation
//! - `method`: the method identifier, e.g. [`SAY_HELLO`]
//! - `timeout_millis`: the caller's deadline (0 = none)
//! - `payload`: the encoded request message
//!
//! The server answers with an [`Outcome`] carrying a status [`Code`] and
//! either the encoded reply or an error detail.
//!
//! # Example
//!
//! ```rust
//! use greeter_protocol::{HelloRequest, Invocation, SAY_HELLO, codec, decode_message, encode_message};
//!
//! let request = HelloRequest::new("World");
//! let invocation = Invocation::new(SAY_HELLO, codec::encode(&request), None);
//! let bytes = encode_message(&invocation).unwrap();
//! let decoded: Invocation = decode_message(&bytes).unwrap();
//! assert_eq!(codec::decode::<HelloRequest>(&decoded.payload).unwrap(), request);
//! ```

pub mod codec;
mod error;
mod framing;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{decode_message, encode_message, read_message, write_message};
pub use types::{Code, HelloReply, HelloRequest, Invocation, Outcome};

/// Method identifier of the one greeter RPC.
pub const SAY_HELLO: &str = "/helloworld.Greeter/SayHello";

/// Port the reference deployment listens on.
pub const DEFAULT_PORT: u16 = 50051;

/// Maximum frame size (4 MiB).
pub const MAX_MESSAGE_SIZE: u32 = 4 * 1024 * 1024;
