//! TCP listener serving greeter invocations.
//!
//! A [`Server`] is an explicit handle: binding claims the endpoint, and
//! dropping the handle (or returning from [`Server::run_until_shutdown`])
//! releases it, so several servers can live in one process.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use greeter_protocol::{Invocation, Outcome, ProtocolError, read_message, write_message};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// TCP server accepting greeter connections.
pub struct Server {
    /// Server configuration.
    config: ServerConfig,
    /// TCP listener.
    listener: TcpListener,
    /// Address the listener is bound to.
    local_addr: SocketAddr,
    /// Semaphore for limiting concurrent connections.
    connection_semaphore: Arc<Semaphore>,
}

impl Server {
    /// Binds a new server to the address in the configuration.
    ///
    /// Fails with [`ServerError::Bind`] if the address is invalid or already
    /// in use. Binding is never retried.
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        if config.max_connections == 0 {
            return Err(ServerError::config("max_connections must be at least 1"));
        }

        let listener = TcpListener::bind(config.bind_addr.as_str())
            .await
            .map_err(|e| ServerError::bind(&config.bind_addr, e))?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "Server listening");

        let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            config,
            listener,
            local_addr,
            connection_semaphore,
        })
    }

    /// Returns the address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts a single connection.
    ///
    /// Waits for a free connection slot first when `max_connections` are
    /// already open.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = self
            .connection_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ServerError::config("connection semaphore closed"))?;

        let (stream, peer_addr) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        debug!(peer = %peer_addr, "Accepted new connection");

        Ok(Connection {
            stream,
            peer_addr,
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Runs the accept loop, spawning the handler for each connection.
    ///
    /// Runs until the process ends.
    pub async fn run<F, Fut>(self, handler: F) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.run_until_shutdown(handler, std::future::pending())
            .await
    }

    /// Runs the accept loop until the shutdown future completes.
    ///
    /// On shutdown the listener is closed at once. Connections still being
    /// served get the configured grace period, after which they are aborted
    /// and their sockets closed.
    pub async fn run_until_shutdown<F, Fut, S>(self, handler: F, shutdown: S) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        S: Future<Output = ()> + Send,
    {
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                accepted = self.accept() => match accepted {
                    Ok(connection) => {
                        connections.spawn(handler(connection));
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                        // Continue accepting despite errors
                    }
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "Connection task failed");
                    }
                }
            }
        }

        let Self {
            config,
            listener,
            local_addr,
            ..
        } = self;
        drop(listener);
        info!(addr = %local_addr, in_flight = connections.len(), "Listener closed");

        drain(&mut connections, config.shutdown_grace).await;
        info!("Server stopped");
        Ok(())
    }
}

/// Waits for in-flight connections, aborting whatever outlives `grace`.
async fn drain(connections: &mut JoinSet<()>, grace: Duration) {
    let finished = tokio::time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if finished.is_err() {
        warn!(
            remaining = connections.len(),
            "Grace period elapsed, closing remaining connections"
        );
        connections.shutdown().await;
    }
}

/// A client connection to the server.
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
}

impl Connection {
    /// Returns the address of the connected client.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Reads an invocation from the connection.
    ///
    /// Returns `Ok(None)` if the connection was closed cleanly.
    pub async fn read_invocation(&mut self) -> ServerResult<Option<Invocation>> {
        match tokio::time::timeout(self.timeout, read_message(&mut self.stream)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServerError::Protocol(ProtocolError::Timeout {
                operation: "read invocation".to_string(),
            })),
        }
    }

    /// Writes an outcome to the connection.
    pub async fn write_outcome(&mut self, outcome: &Outcome) -> ServerResult<()> {
        match tokio::time::timeout(self.timeout, write_message(&mut self.stream, outcome)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServerError::Protocol(ProtocolError::Timeout {
                operation: "write outcome".to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greeter_protocol::{HelloReply, HelloRequest, SAY_HELLO, codec};
    use tokio::io::AsyncWriteExt;

    fn local_config() -> ServerConfig {
        ServerConfig::new("127.0.0.1:0").with_connection_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn bind_reports_local_addr() {
        let server = Server::bind(local_config()).await.unwrap();
        let addr = server.local_addr();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn bind_rejects_address_in_use() {
        let first = Server::bind(local_config()).await.unwrap();
        let taken = first.local_addr().to_string();

        let result = Server::bind(ServerConfig::new(&taken)).await;
        assert!(matches!(result, Err(ServerError::Bind { addr, .. }) if addr == taken));
    }

    #[tokio::test]
    async fn bind_rejects_invalid_address() {
        let result = Server::bind(ServerConfig::new("not an address")).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[tokio::test]
    async fn bind_rejects_zero_connections() {
        let result = Server::bind(local_config().with_max_connections(0)).await;
        assert!(matches!(result, Err(ServerError::Config { .. })));
    }

    #[tokio::test]
    async fn connection_roundtrip() {
        let server = Server::bind(local_config()).await.unwrap();
        let addr = server.local_addr();

        // Spawn a client task
        let client_task = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();

            let invocation =
                Invocation::new(SAY_HELLO, codec::encode(&HelloRequest::new("x")), None);
            write_message(&mut stream, &invocation).await.unwrap();

            let outcome: Outcome = read_message(&mut stream).await.unwrap().unwrap();
            assert_eq!(outcome.request_id, invocation.request_id);
            let reply: HelloReply = codec::decode(&outcome.payload).unwrap();
            assert_eq!(reply.message, "pong");
        });

        // Accept and handle the connection
        let mut conn = server.accept().await.unwrap();
        let invocation = conn.read_invocation().await.unwrap().unwrap();
        assert_eq!(invocation.method, SAY_HELLO);

        let outcome = Outcome::ok(&invocation.request_id, codec::encode(&HelloReply::new("pong")));
        conn.write_outcome(&outcome).await.unwrap();

        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn connection_handles_client_disconnect() {
        let server = Server::bind(local_config()).await.unwrap();
        let addr = server.local_addr();

        // Connect and immediately disconnect
        let handle = tokio::spawn(async move {
            let _stream = TcpStream::connect(addr).await.unwrap();
        });

        let mut conn = server.accept().await.unwrap();
        handle.await.unwrap();

        // Read should return None (clean EOF)
        let result = conn.read_invocation().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn connection_rejects_garbage_envelope() {
        let server = Server::bind(local_config()).await.unwrap();
        let addr = server.local_addr();

        tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(&[0, 0, 0, 2, 0xff, 0xff]).await.unwrap();
            // Keep the socket open until the server has read the frame
            tokio::time::sleep(Duration::from_millis(200)).await;
        });

        let mut conn = server.accept().await.unwrap();
        let result = conn.read_invocation().await;
        assert!(matches!(
            result,
            Err(ServerError::Protocol(ProtocolError::MalformedMessage(_)))
        ));
    }

    #[tokio::test]
    async fn idle_connection_times_out() {
        let config = local_config().with_connection_timeout(Duration::from_millis(50));
        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr();

        let _client = TcpStream::connect(addr).await.unwrap();
        let mut conn = server.accept().await.unwrap();

        let result = conn.read_invocation().await;
        assert!(matches!(
            result,
            Err(ServerError::Protocol(ProtocolError::Timeout { .. }))
        ));
    }

    #[tokio::test]
    async fn shutdown_releases_endpoint() {
        let server = Server::bind(local_config()).await.unwrap();
        let addr = server.local_addr();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(server.run_until_shutdown(
            |_conn| async {},
            async {
                let _ = rx.await;
            },
        ));

        tx.send(()).unwrap();
        task.await.unwrap().unwrap();

        assert!(TcpStream::connect(addr).await.is_err());
        // The address can be claimed again
        let again = Server::bind(ServerConfig::new(addr.to_string())).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn shutdown_aborts_connections_after_grace() {
        let config = local_config().with_shutdown_grace(Duration::from_millis(50));
        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(server.run_until_shutdown(
            |conn| async move {
                // Holds the connection and never finishes on its own
                let _conn = conn;
                std::future::pending::<()>().await;
            },
            async {
                let _ = rx.await;
            },
        ));

        let mut client = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(2), task).await;
        assert!(stopped.is_ok());

        // The aborted task dropped the server side of the socket
        let eof: Option<Outcome> = read_message(&mut client).await.unwrap();
        assert!(eof.is_none());
    }
}
