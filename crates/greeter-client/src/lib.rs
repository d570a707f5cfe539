//! Greeter client: unary call path, configuration, CLI.
//!
//! This crate provides the `greeter` command-line interface and the
//! [`GreeterClient`] used to call the greeter server.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use greeter_client::GreeterClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GreeterClient::new("127.0.0.1:50051", Duration::from_secs(1));
//!     let reply = client.say_hello("World").await?;
//!     assert_eq!(reply.message, "Hello World");
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use channel::{DEFAULT_TIMEOUT, GreeterClient, call, default_endpoint};
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
