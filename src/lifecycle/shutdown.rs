//! Graceful stop for the proxy listener.
//!
//! One `Shutdown` per process (or per test server). The HTTP server holds a
//! receiver and stops accepting once it fires; in-flight requests drain.

use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed server. Returns false when none was listening.
    pub fn trigger(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on Ctrl+C or when the coordinator fires, whichever comes first.
pub async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => tracing::info!("Ctrl+C received, draining in-flight requests"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C, waiting for trigger");
                let _ = rx.recv().await;
            }
        },
        _ = rx.recv() => tracing::info!("Shutdown triggered, draining in-flight requests"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_releases_waiter() {
        let shutdown = Shutdown::new();
        let waiter = tokio::spawn(wait_for_shutdown(shutdown.subscribe()));

        assert!(shutdown.trigger());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
    }

    #[test]
    fn test_trigger_without_listeners() {
        assert!(!Shutdown::new().trigger());
    }
}
