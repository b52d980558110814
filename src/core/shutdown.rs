//! Shutdown Coordination
//!
//! Turns process signals into one shutdown event: registered cleanups run
//! once, then every subscriber is notified over a broadcast channel. The
//! binary registers its `QueueManager` here so a Ctrl-C disposes every topic
//! and releases producers and consumers suspended on them.

use crate::core::cleanup::Cleanup;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: AtomicBool,
    cleanups: Mutex<Vec<Arc<dyn Cleanup>>>,
}

impl ShutdownCoordinator {
    /// Create a new coordinator with its first shutdown receiver
    pub fn new() -> (Arc<Self>, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        let coordinator = Arc::new(Self {
            shutdown_tx,
            shutdown_requested: AtomicBool::new(false),
            cleanups: Mutex::new(Vec::new()),
        });
        (coordinator, shutdown_rx)
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Register a resource to release when shutdown triggers
    ///
    /// Registering after shutdown has already triggered runs the cleanup
    /// immediately.
    pub fn register_cleanup(&self, cleanup: Arc<dyn Cleanup>) {
        if self.is_shutdown_requested() {
            cleanup.cleanup();
            return;
        }
        crate::core::sync::lock_or_recover(self.cleanups.lock()).push(cleanup);
    }

    /// Trigger shutdown
    ///
    /// Only the first call runs the registered cleanups; every call
    /// re-broadcasts so late subscribers still observe the signal.
    pub fn trigger_shutdown(&self) {
        let first = !self.shutdown_requested.swap(true, Ordering::AcqRel);
        if first {
            let cleanups = std::mem::take(&mut *crate::core::sync::lock_or_recover(
                self.cleanups.lock(),
            ));
            log::debug!("Shutdown triggered, running {} cleanup(s)", cleanups.len());
            for cleanup in cleanups {
                cleanup.cleanup();
            }
        }
        let _ = self.shutdown_tx.send(());
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Run a future with signal handlers installed
    ///
    /// The closure receives the coordinator (to register cleanups) and a
    /// receiver that fires when a signal arrives.
    pub async fn guard<F, Fut, R>(future_fn: F) -> R
    where
        F: FnOnce(Arc<Self>, broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let (coordinator, shutdown_rx) = Self::new();
        coordinator.install_signal_handlers();
        future_fn(coordinator, shutdown_rx).await
    }

    /// Spawn signal listeners that trigger shutdown
    ///
    /// A second signal exits the process with status 130. Must be called
    /// from within a tokio runtime.
    pub fn install_signal_handlers(self: &Arc<Self>) {
        #[cfg(unix)]
        {
            // SAFETY: restoring the default SIGPIPE disposition has no
            // preconditions and happens before any pipe writes.
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            use std::sync::atomic::AtomicUsize;
            use tokio::signal::unix::{signal, SignalKind};

            let signal_count = Arc::new(AtomicUsize::new(0));
            let signals = [
                SignalKind::interrupt(),
                SignalKind::terminate(),
                SignalKind::hangup(),
                SignalKind::quit(),
            ];

            for kind in signals {
                let coordinator = Arc::clone(self);
                let sig_ctr = Arc::clone(&signal_count);

                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        while sig.recv().await.is_some() {
                            let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                            if prev >= 1 {
                                log::warn!("Second signal received; exiting");
                                std::process::exit(130);
                            }
                            log::info!("Signal received, shutting down (repeat to force exit)");
                            coordinator.trigger_shutdown();
                        }
                    }
                });
            }
        }

        #[cfg(not(unix))]
        {
            let coordinator = Arc::clone(self);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    coordinator.trigger_shutdown();
                }
            });
        }
    }
}
