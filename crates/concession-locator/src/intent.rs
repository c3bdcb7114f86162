//! The pending "locate me" intent handed from a call-to-action page to the
//! map page.
//!
//! One record lives under [`INTENT_KEY`] in durable key/value storage:
//!
//! ```json
//! {"type":"address","address":"69007 Lyon","created_at":"2026-10-19T09:12:00Z"}
//! {"type":"geolocate"}
//! ```
//!
//! `created_at` is optional. Records carrying it expire after the store's
//! max age; records without it never expire. Anything that does not parse
//! is treated as absent and removed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IntentStoreError;

pub const INTENT_KEY: &str = "concession.locate_intent";

/// What the visitor asked for on the call-to-action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LocateIntent {
    Address { address: String },
    Geolocate,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredIntent {
    #[serde(flatten)]
    intent: LocateIntent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

/// Durable string key/value storage.
pub trait IntentStorage: Send + Sync {
    /// # Errors
    ///
    /// Returns [`IntentStoreError::Io`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, IntentStoreError>;

    /// # Errors
    ///
    /// Returns [`IntentStoreError::Io`] if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), IntentStoreError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`IntentStoreError::Io`] if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), IntentStoreError>;
}

/// One file per key under a directory. Survives process restarts.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &std::path::Path, source: std::io::Error) -> IntentStoreError {
    IntentStoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl IntentStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, IntentStoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IntentStoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.path_for(key);
        // Write-then-rename so a reader never sees a half-written record.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))
    }

    fn remove(&self, key: &str) -> Result<(), IntentStoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

/// In-process storage, for tests and single-process demos.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntentStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, IntentStoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IntentStoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), IntentStoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Holds at most one pending [`LocateIntent`].
#[derive(Clone)]
pub struct IntentStore {
    storage: Arc<dyn IntentStorage>,
    max_age: Option<chrono::Duration>,
}

impl std::fmt::Debug for IntentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentStore")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl IntentStore {
    #[must_use]
    pub fn new(storage: Arc<dyn IntentStorage>) -> Self {
        Self {
            storage,
            max_age: None,
        }
    }

    /// Intents stamped longer ago than `max_age` are discarded on read.
    #[must_use]
    pub fn with_max_age(mut self, max_age: std::time::Duration) -> Self {
        self.max_age = chrono::Duration::from_std(max_age).ok();
        self
    }

    /// Stores `intent`, replacing any unconsumed one.
    ///
    /// # Errors
    ///
    /// Returns [`IntentStoreError`] if the record cannot be serialized or written.
    pub fn set(&self, intent: &LocateIntent) -> Result<(), IntentStoreError> {
        let record = StoredIntent {
            intent: intent.clone(),
            created_at: Some(Utc::now()),
        };
        let json = serde_json::to_string(&record)?;
        self.storage.set(INTENT_KEY, &json)?;
        tracing::debug!(?intent, "stored pending locate intent");
        Ok(())
    }

    /// Reads the pending intent without consuming it.
    ///
    /// Corrupt or expired records are removed and reported as absent. Read
    /// failures are logged and reported as absent.
    #[must_use]
    pub fn claim(&self) -> Option<IntentClaim<'_>> {
        let raw = match self.storage.get(INTENT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read pending locate intent");
                return None;
            }
        };

        let record = match serde_json::from_str::<StoredIntent>(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed locate intent");
                self.clear();
                return None;
            }
        };

        if let (Some(created_at), Some(max_age)) = (record.created_at, self.max_age) {
            if Utc::now() - created_at > max_age {
                tracing::info!(%created_at, "discarding expired locate intent");
                self.clear();
                return None;
            }
        }

        Some(IntentClaim {
            store: self,
            intent: record.intent,
        })
    }

    /// Reads and consumes the pending intent.
    #[must_use]
    pub fn take(&self) -> Option<LocateIntent> {
        self.claim().map(IntentClaim::redeem)
    }

    fn clear(&self) {
        if let Err(e) = self.storage.remove(INTENT_KEY) {
            tracing::warn!(error = %e, "could not clear locate intent");
        }
    }
}

/// A pending intent that has been read but not yet handed off.
///
/// Dropping the claim leaves the intent in storage; [`IntentClaim::redeem`]
/// removes it.
#[derive(Debug)]
pub struct IntentClaim<'a> {
    store: &'a IntentStore,
    intent: LocateIntent,
}

impl IntentClaim<'_> {
    #[must_use]
    pub fn intent(&self) -> &LocateIntent {
        &self.intent
    }

    #[must_use]
    pub fn redeem(self) -> LocateIntent {
        self.store.clear();
        self.intent
    }
}

#[cfg(test)]
#[path = "intent_test.rs"]
mod tests;
