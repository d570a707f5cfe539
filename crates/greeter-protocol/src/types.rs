//! Message and envelope types for the greeter protocol.
//!
//! These are the records `prost-build` would generate from:
//!
//! ```proto
//! syntax = "proto3";
//! package helloworld;
//!
//! service Greeter {
//!   rpc SayHello (HelloRequest) returns (HelloReply) {}
//! }
//!
//! message HelloRequest { string name = 1; }
//! message HelloReply { string message = 1; }
//! ```
//!
//! plus the two envelope records that carry a call over the wire.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

/// The request message containing the user's name.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct HelloRequest {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
}

impl HelloRequest {
    /// Creates a request for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The response message containing the greeting.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct HelloReply {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
}

impl HelloReply {
    /// Creates a reply carrying the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Status of a completed invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Code {
    /// The handler ran and the payload holds its reply.
    Ok = 0,
    /// The request payload or envelope could not be decoded.
    MalformedMessage = 1,
    /// No handler is registered for the method.
    Unimplemented = 2,
    /// The handler did not finish before the caller's deadline.
    DeadlineExceeded = 3,
    /// Anything else that went wrong on the server.
    Internal = 4,
}

impl Code {
    /// Returns the wire name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::MalformedMessage => "MALFORMED_MESSAGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call of a method, as sent by the client.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Invocation {
    /// Unique request ID for correlation.
    #[prost(string, tag = "1")]
    pub request_id: ::prost::alloc::string::String,
    /// Method identifier.
    #[prost(string, tag = "2")]
    pub method: ::prost::alloc::string::String,
    /// Caller's deadline in milliseconds, 0 if none.
    #[prost(uint64, tag = "3")]
    pub timeout_millis: u64,
    /// Encoded request message.
    #[prost(bytes = "vec", tag = "4")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

impl Invocation {
    /// Creates an invocation with a fresh request ID.
    pub fn new(method: impl Into<String>, payload: Vec<u8>, timeout: Option<Duration>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: method.into(),
            // Sub-millisecond deadlines round up so they are not read as "none";
            // ones too long for a u64 saturate.
            timeout_millis: timeout.map_or(0, |t| {
                u64::try_from(t.as_millis()).unwrap_or(u64::MAX).max(1)
            }),
            payload,
        }
    }

    /// Returns the caller's deadline, if one was sent.
    pub fn deadline(&self) -> Option<Duration> {
        (self.timeout_millis > 0).then(|| Duration::from_millis(self.timeout_millis))
    }
}

/// The result of one invocation, as sent back by the server.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Outcome {
    /// Request ID echoed from the invocation.
    #[prost(string, tag = "1")]
    pub request_id: ::prost::alloc::string::String,
    #[prost(enumeration = "Code", tag = "2")]
    pub status: i32,
    /// Error text when the status is not `Ok`.
    #[prost(string, tag = "3")]
    pub detail: ::prost::alloc::string::String,
    /// Encoded reply message when the status is `Ok`.
    #[prost(bytes = "vec", tag = "4")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

impl Outcome {
    /// Creates a successful outcome.
    pub fn ok(request_id: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            request_id: request_id.into(),
            status: Code::Ok as i32,
            detail: String::new(),
            payload,
        }
    }

    /// Creates a failed outcome.
    pub fn error(request_id: impl Into<String>, code: Code, detail: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: code as i32,
            detail: detail.into(),
            payload: Vec::new(),
        }
    }

    /// Returns the status code; unknown values read as `Internal`.
    pub fn code(&self) -> Code {
        Code::try_from(self.status).unwrap_or(Code::Internal)
    }

    /// Returns true if the call succeeded.
    pub fn is_ok(&self) -> bool {
        self.code() == Code::Ok
    }
}
