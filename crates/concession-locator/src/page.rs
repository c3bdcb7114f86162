//! One-shot "the page has mounted" signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Resolves once the map page's inputs exist.
///
/// Clones share the same signal. Marking ready is idempotent.
#[derive(Debug, Clone)]
pub struct PageReady {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for PageReady {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReady {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that is already ready, for surfaces that mount synchronously.
    #[must_use]
    pub fn already_ready() -> Self {
        let ready = Self::new();
        ready.mark_ready();
        ready
    }

    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Waits up to `bound` for readiness. Returns `false` on timeout.
    pub async fn wait(&self, bound: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        let ready = matches!(
            tokio::time::timeout(bound, rx.wait_for(|ready| *ready)).await,
            Ok(Ok(_))
        );
        ready
    }
}
