//! Flat-file JSON document store.
//!
//! # Invariants
//! - One file per document kind inside the data directory.
//! - Writes land in a sibling temp file first and are renamed into place,
//!   so readers never observe a half-written document.

use super::{DocumentKind, DocumentStore, StoreError, StoreResult};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each document as `<data_dir>/<kind>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|source| StoreError::Io {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    /// Path of the file backing `kind`.
    pub fn document_path(&self, kind: DocumentKind) -> PathBuf {
        self.data_dir.join(format!("{}.json", kind.as_str()))
    }
}

impl DocumentStore for JsonFileStore {
    fn read_raw(&self, kind: DocumentKind) -> StoreResult<Option<String>> {
        let path = self.document_path(kind);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write_raw(&self, kind: DocumentKind, body: &str) -> StoreResult<()> {
        let path = self.document_path(kind);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, body).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(
            "event=store_write module=store status=ok kind={kind} bytes={}",
            body.len()
        );
        Ok(())
    }
}
