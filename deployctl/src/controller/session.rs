//! Poll session ownership

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::deployment::AttemptKey;

/// Shutdown signal handed to a session's poll task
pub type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

struct ActiveSession {
    key: AttemptKey,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// The single background poll loop of the submission controller.
///
/// Holds at most one running poll task. Starting a session cancels the
/// previous one first, so two loops never run at the same time.
#[derive(Default)]
pub struct PollSession {
    active: Option<ActiveSession>,
}

impl PollSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling for `key`, replacing any running session.
    ///
    /// `task` receives the session's shutdown signal and is spawned onto the
    /// runtime.
    pub fn start<F, Fut>(&mut self, key: AttemptKey, task: F)
    where
        F: FnOnce(ShutdownSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let shutdown_signal: ShutdownSignal = Box::pin(async move {
            let _ = shutdown_rx.await;
        });

        debug!(attempt = %key, "Starting poll session");
        let handle = tokio::spawn(task(shutdown_signal));
        self.active = Some(ActiveSession {
            key,
            shutdown_tx,
            handle,
        });
    }

    /// Stop the running session, if any, and return the key it was bound to
    pub fn cancel(&mut self) -> Option<AttemptKey> {
        let session = self.active.take()?;
        debug!(attempt = %session.key, "Cancelling poll session");
        let _ = session.shutdown_tx.send(());
        // Also drops a result query that is still in flight
        session.handle.abort();
        Some(session.key)
    }

    /// Whether a session is currently owned
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Key of the running session
    pub fn key(&self) -> Option<&AttemptKey> {
        self.active.as_ref().map(|session| &session.key)
    }

    /// Whether the running session belongs to `key`
    pub fn is_bound_to(&self, key: &AttemptKey) -> bool {
        self.key() == Some(key)
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for PollSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollSession")
            .field("key", &self.key())
            .finish()
    }
}
