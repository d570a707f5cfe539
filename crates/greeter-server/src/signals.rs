//! Shutdown requests for a running server.
//!
//! A [`SignalHandler`] owns a shutdown flag. The flag is raised by SIGTERM or
//! SIGINT (Ctrl-C on other platforms) once [`SignalHandler::spawn_listener`]
//! has been called, or by any [`ShutdownHandle`] at any time. It is never
//! lowered again.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

/// Turns process signals into a shutdown request.
#[derive(Default)]
pub struct SignalHandler {
    handle: ShutdownHandle,
}

impl SignalHandler {
    /// Creates a handler with the flag lowered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a task that raises the flag on the first termination signal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_listener(&self) {
        let handle = self.handle.clone();
        tokio::spawn(async move {
            match termination_signal().await {
                Ok(name) => {
                    info!(signal = name, "Shutdown requested");
                    handle.trigger();
                }
                Err(e) => error!(error = %e, "Cannot listen for termination signals"),
            }
        });
    }

    /// Returns a future that completes once shutdown is requested.
    pub fn shutdown(&self) -> ShutdownSignal {
        self.handle.wait()
    }

    /// Returns true once shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.handle.is_shutdown()
    }

    /// Requests shutdown without a signal.
    pub fn trigger_shutdown(&self) {
        self.handle.trigger();
    }

    /// Returns a handle sharing this handler's flag.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }
}

#[cfg(unix)]
async fn termination_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    Ok(tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = int.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn termination_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}

/// Completes when shutdown is requested.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for the flag to be raised.
    pub async fn wait(mut self) {
        // Err: the flag's owner is gone, which can only mean the server is going away too.
        let _ = self.rx.wait_for(|raised| *raised).await;
    }
}

/// Clonable access to a shutdown flag.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }
}

impl ShutdownHandle {
    /// Raises the flag.
    pub fn trigger(&self) {
        // send_replace stores the value even while nobody is waiting
        self.tx.send_replace(true);
    }

    /// Returns true once the flag is raised.
    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns a future that completes once the flag is raised.
    pub fn wait(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}
