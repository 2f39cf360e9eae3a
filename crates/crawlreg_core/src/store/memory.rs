//! In-process document store.

use super::{DocumentKind, DocumentStore, StoreResult};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Keeps documents in memory; used for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<DocumentKind, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with raw document text.
    pub fn with_document(self, kind: DocumentKind, body: impl Into<String>) -> Self {
        self.lock().insert(kind, body.into());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<DocumentKind, String>> {
        // A poisoned map still holds whole documents; keep serving it.
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn read_raw(&self, kind: DocumentKind) -> StoreResult<Option<String>> {
        Ok(self.lock().get(&kind).cloned())
    }

    fn write_raw(&self, kind: DocumentKind, body: &str) -> StoreResult<()> {
        self.lock().insert(kind, body.to_string());
        Ok(())
    }
}
