//! Keyed trailing-edge debounce timers.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs an action after a quiet period, per key.
///
/// Scheduling under a key aborts whatever was pending under that key, so
/// only the last action in a burst runs. Dropping the debouncer aborts all
/// pending actions.
#[derive(Debug)]
pub struct Debouncer<K> {
    pending: Mutex<HashMap<K, JoinHandle<()>>>,
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> Debouncer<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|_, h| !h.is_finished());
        if let Some(previous) = pending.insert(key, handle) {
            previous.abort();
        }
    }

    /// Returns `true` if an action was still pending.
    pub fn cancel(&self, key: &K) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.remove(key) {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.get(key).is_some_and(|h| !h.is_finished())
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.values().any(|h| !h.is_finished())
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }
}
