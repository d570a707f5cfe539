//! Serve command: runs the greeter server in the foreground.

use tracing::info;

use greeter_server::{
    Server, ServerConfig, SignalHandler, greeter_router, make_connection_handler,
};

use crate::error::ClientResult;

/// Runs the server until SIGTERM/SIGINT.
///
/// Bind failures are returned to the caller; nothing is retried.
pub async fn run(config: ServerConfig) -> ClientResult<()> {
    let server = Server::bind(config).await?;

    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener();

    let router = greeter_router();
    info!(
        addr = %server.local_addr(),
        methods = ?router.methods(),
        "Serving greeter"
    );

    let handler = make_connection_handler(router);
    server
        .run_until_shutdown(handler, signal_handler.shutdown().wait())
        .await?;

    Ok(())
}
