//! Keyed in-memory registries shared between concurrent callers.
//!
//! Each [`Registry`] is its own lock domain. Reads hold the shared lock only
//! long enough to clone values out, so callers always get a snapshot.

use std::collections::HashMap;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::types::{BypassStatus, ContainerInterfaces};

/// Running bypass sessions by container ID.
pub type BypassRegistry = Registry<BypassStatus>;

/// Reported interfaces by container ID.
pub type InterfaceRegistry = Registry<ContainerInterfaces>;

#[derive(Debug)]
pub struct Registry<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V: Clone> Registry<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of every value, in no particular order.
    pub async fn list(&self) -> Vec<V> {
        self.entries.read().await.values().cloned().collect()
    }

    /// Snapshot of the whole map.
    pub async fn snapshot(&self) -> HashMap<String, V> {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<V> {
        self.entries.read().await.get(id).cloned()
    }

    /// Insert or replace the entry for `id`, returning the replaced value.
    pub async fn insert(&self, id: String, value: V) -> Option<V> {
        self.entries.write().await.insert(id, value)
    }

    /// Remove the entry for `id`. Absent IDs are not an error.
    pub async fn remove(&self, id: &str) -> Option<V> {
        self.entries.write().await.remove(id)
    }

    /// Exclusive access for multi-step updates that must not interleave.
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, HashMap<String, V>> {
        self.entries.write().await
    }
}

impl<V: Clone> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}
