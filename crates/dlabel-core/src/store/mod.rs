//! Concurrency-safe cache of the latest result per label.
mod snapshot;
pub use snapshot::LabelSet;

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use dlabel_model::LabelResult;
use tracing::{trace, warn};

/// Shared mapping from label name to its latest [`LabelResult`].
///
/// The key set is fixed at construction: every configured name starts with a
/// pending result and [`ResultStore::set`] never adds new keys. Writers replace
/// whole entries under the write lock, so a [`ResultStore::snapshot`] never
/// observes a partially written value.
#[derive(Clone, Debug, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<BTreeMap<String, LabelResult>>>,
}

impl ResultStore {
    /// Create a store with a pending entry for every name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let map = names
            .into_iter()
            .map(|n| (n.into(), LabelResult::pending()))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Replace the result for `name`.
    ///
    /// Names that were not configured are ignored.
    pub fn set(&self, name: &str, result: LabelResult) {
        let mut map = self.write();
        match map.get_mut(name) {
            Some(slot) => {
                trace!(label = name, status = ?result.status(), "label result stored");
                *slot = result;
            }
            None => warn!(label = name, "ignoring result for unknown label"),
        }
    }

    /// Independent copy of every entry.
    pub fn snapshot(&self) -> LabelSet {
        LabelSet::from(self.read().clone())
    }

    /// Current result for a single label.
    pub fn get(&self, name: &str) -> Option<LabelResult> {
        self.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a torn entry (entries are
    // swapped whole), so poisoned guards are safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, LabelResult>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, LabelResult>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
