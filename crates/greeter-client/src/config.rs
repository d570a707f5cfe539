//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/greeter/config.toml` by default. Every key is optional.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use greeter_server::ServerConfig;

use crate::channel::{DEFAULT_TIMEOUT, GreeterClient, default_endpoint};

/// Configuration for the greeter binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Settings for outgoing calls.
    pub client: CallSettings,

    /// Settings for `greeter serve`.
    pub server: ServeSettings,
}

/// Settings for outgoing calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallSettings {
    /// Server address as `host:port`.
    pub endpoint: String,

    /// Call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl CallSettings {
    /// Builds a client from these settings.
    pub fn to_client(&self) -> GreeterClient {
        GreeterClient::new(&self.endpoint, Duration::from_millis(self.timeout_ms))
    }
}

/// Settings for the server started by `greeter serve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeSettings {
    /// Address to listen on as `host:port`.
    pub bind: String,

    /// Idle timeout for a connection, in seconds.
    pub connection_timeout_secs: u64,

    /// Maximum concurrent connections.
    pub max_connections: usize,

    /// Time in-flight calls get to finish on shutdown, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for ServeSettings {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind: defaults.bind_addr,
            connection_timeout_secs: defaults.connection_timeout.as_secs(),
            max_connections: defaults.max_connections,
            shutdown_grace_ms: defaults.shutdown_grace.as_millis() as u64,
        }
    }
}

impl ServeSettings {
    /// Converts to server configuration.
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig::new(&self.bind)
            .with_connection_timeout(Duration::from_secs(self.connection_timeout_secs))
            .with_max_connections(self.max_connections)
            .with_shutdown_grace(Duration::from_millis(self.shutdown_grace_ms))
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("greeter")
    }

    /// Checks values that parse but cannot work.
    pub fn validate(&self) -> Result<(), String> {
        if self.client.endpoint.trim().is_empty() {
            return Err("client.endpoint must not be empty".to_string());
        }
        if !has_port(&self.client.endpoint) {
            return Err(format!(
                "client.endpoint {:?} must be host:port",
                self.client.endpoint
            ));
        }
        if self.client.timeout_ms == 0 {
            return Err("client.timeout_ms must be greater than 0".to_string());
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(format!(
                "server.bind {:?} is not a socket address",
                self.server.bind
            ));
        }
        if self.server.max_connections == 0 {
            return Err("server.max_connections must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Returns true if `endpoint` ends in `:<port>`.
fn has_port(endpoint: &str) -> bool {
    endpoint
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
}
