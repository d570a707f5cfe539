//! Listener and connection settings for [`Server`](crate::Server).

use std::time::Duration;

use greeter_protocol::DEFAULT_PORT;

/// Settings passed to [`Server::bind`](crate::Server::bind).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on, as `host:port`.
    pub bind_addr: String,

    /// How long a connection may sit idle between invocations.
    pub connection_timeout: Duration,

    /// Connections served at once; further clients wait in the accept backlog.
    pub max_connections: usize,

    /// How long in-flight connections get to finish after shutdown.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            connection_timeout: Duration::from_secs(30),
            max_connections: 100,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    /// Default settings listening on `bind_addr` (port `0` picks a free port).
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Default::default()
        }
    }

    /// Sets the idle timeout per connection.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the connection limit.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets how long shutdown waits for in-flight calls.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

/// Returns the default listen address, all interfaces on port 50051.
pub fn default_bind_addr() -> String {
    format!("0.0.0.0:{}", DEFAULT_PORT)
}
