//! Configuration store interface.
//!
//! Herald only needs a document store for per-guild settings (the command
//! prefix). Documents are JSON values addressed by slash-separated paths such
//! as `guilds/1234`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use crate::error::{StoreError, StoreResult};

/// A document store holding bot configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// Reads the document at `path`, or `None` if it does not exist.
    async fn document(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Writes `document` at `path`, replacing any previous document.
    async fn store(&self, document: Value, path: &str) -> StoreResult<()>;
}

/// A shared config store trait object.
pub type BoxedStore = Arc<dyn ConfigStore>;

/// Validates a document path.
fn check_path(path: &str) -> StoreResult<()> {
    if path.is_empty() || path.split('/').any(str::is_empty) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// An in-process [`ConfigStore`].
///
/// Useful for tests and for bots that do not persist configuration.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns `true` if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Returns a copy of the document at `path` without going through the
    /// async interface.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.documents.read().get(path).cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn document(&self, path: &str) -> StoreResult<Option<Value>> {
        check_path(path)?;
        Ok(self.documents.read().get(path).cloned())
    }

    async fn store(&self, document: Value, path: &str) -> StoreResult<()> {
        check_path(path)?;
        trace!(path, "Storing document");
        self.documents.write().insert(path.to_string(), document);
        Ok(())
    }
}
