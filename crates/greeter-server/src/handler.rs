//! Per-connection invocation loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use greeter_protocol::{Code, Invocation, Outcome, ProtocolError};

use crate::error::{ServerError, ServerResult};
use crate::router::Router;
use crate::server::Connection;

/// Serves invocations arriving on a connection against a router.
#[derive(Clone)]
pub struct ConnectionHandler {
    router: Arc<Router>,
}

impl ConnectionHandler {
    /// Creates a handler dispatching to `router`.
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// Handles a single invocation and builds its outcome.
    pub async fn handle(&self, invocation: Invocation) -> Outcome {
        debug!(
            request_id = %invocation.request_id,
            method = %invocation.method,
            timeout_ms = invocation.timeout_millis,
            "Dispatching invocation"
        );

        let result = self
            .router
            .route(
                &invocation.method,
                &invocation.payload,
                invocation.deadline(),
            )
            .await;

        match result {
            Ok(payload) => Outcome::ok(invocation.request_id, payload),
            Err(status) => {
                warn!(
                    request_id = %invocation.request_id,
                    method = %invocation.method,
                    code = %status.code(),
                    detail = status.detail(),
                    "Invocation failed"
                );
                Outcome::error(invocation.request_id, status.code(), status.detail())
            }
        }
    }

    /// Serves invocations on the connection until the client disconnects.
    ///
    /// An undecodable envelope is answered with a `MalformedMessage` outcome
    /// and ends the connection, since the stream can no longer be trusted.
    pub async fn handle_connection(&self, mut conn: Connection) -> ServerResult<()> {
        let peer = conn.peer_addr();
        loop {
            match conn.read_invocation().await {
                Ok(Some(invocation)) => {
                    let outcome = self.handle(invocation).await;
                    conn.write_outcome(&outcome).await?;
                }
                Ok(None) => {
                    // Client disconnected cleanly
                    debug!(peer = %peer, "Client disconnected");
                    return Ok(());
                }
                Err(ServerError::Protocol(ProtocolError::MalformedMessage(e))) => {
                    warn!(peer = %peer, error = %e, "Malformed invocation");
                    let outcome = Outcome::error("", Code::MalformedMessage, e.to_string());
                    conn.write_outcome(&outcome).await?;
                    return Err(ProtocolError::MalformedMessage(e).into());
                }
                Err(e) => {
                    warn!(peer = %peer, error = %e, "Error reading invocation");
                    return Err(e);
                }
            }
        }
    }
}

/// Creates a connection handler function for use with `Server::run`.
///
/// This returns a closure that can be passed to `Server::run` or
/// `Server::run_until_shutdown`.
pub fn make_connection_handler(
    router: Router,
) -> impl Fn(Connection) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
    let handler = ConnectionHandler::new(Arc::new(router));
    move |conn| {
        let handler = handler.clone();
        Box::pin(async move {
            if let Err(e) = handler.handle_connection(conn).await {
                warn!(error = %e, "Connection handler error");
            }
        })
    }
}
