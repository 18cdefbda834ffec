//! Graceful shutdown controller for the agora service.
//!
//! Listens for SIGINT/SIGTERM and fans the shutdown request out over a
//! `tokio::sync::broadcast` channel. The HTTP server awaits a
//! [`ShutdownController::signalled`] future so in-flight requests drain
//! before the process exits.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::signal;
use tokio::sync::broadcast;

/// Coordinates graceful shutdown.
///
/// One controller serves any number of waiters: each call to [`signalled`]
/// yields a future that resolves once shutdown has been requested, whether
/// by OS signal or programmatically. Futures taken out after the request
/// resolve immediately.
///
/// [`signalled`]: ShutdownController::signalled
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
    down: AtomicBool,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            down: AtomicBool::new(false),
        }
    }

    /// A future that resolves once shutdown has been requested.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        // Subscribe before reading the flag: a request landing between the
        // two is then visible on one path or the other.
        let mut rx = self.tx.subscribe();
        let already_down = self.down.load(Ordering::SeqCst);
        async move {
            if already_down {
                return;
            }
            // RecvError::Closed also counts: the controller is gone.
            let _ = rx.recv().await;
        }
    }

    /// Request shutdown programmatically.
    pub fn shutdown(&self) {
        self.down.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    /// Block until SIGINT or SIGTERM arrives, then request shutdown.
    pub async fn wait_for_signal(&self) {
        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = signal::ctrl_c() => tracing::info!(signal = "SIGINT", "shutdown requested"),
                _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "shutdown requested"),
            }
        }

        #[cfg(not(unix))]
        {
            let _ = signal::ctrl_c().await;
            tracing::info!(signal = "SIGINT", "shutdown requested");
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
