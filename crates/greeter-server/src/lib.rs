//! Greeter server: TCP listener, method router, `SayHello` handler.
//!
//! This crate provides the server side of the greeter protocol:
//! - A TCP [`Server`] handle with an explicit bind / serve / shutdown lifecycle
//! - A [`Router`] mapping method identifiers to typed handlers
//! - The [`say_hello`] handler and its [`greeter_router`]
//! - Signal handling for graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use greeter_server::{Server, ServerConfig, SignalHandler, greeter_router, make_connection_handler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(ServerConfig::default()).await?;
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener();
//!
//!     let handler = make_connection_handler(greeter_router());
//!     server.run_until_shutdown(handler, signals.shutdown().wait()).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod greeter;
mod handler;
mod router;
mod server;
mod signals;

pub use config::{ServerConfig, default_bind_addr};
pub use error::{ServerError, ServerResult};
pub use greeter::{greeter_router, say_hello};
pub use handler::{ConnectionHandler, make_connection_handler};
pub use router::{Router, Status};
pub use server::{Connection, Server};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
