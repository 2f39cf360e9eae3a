//! Persistence adapters for the two registry documents.
//!
//! # Responsibility
//! - Load and store the organization list and configuration map as whole
//!   documents.
//! - Apply the lenient-read policy: a missing or unparseable document loads
//!   as empty instead of failing, and one bad record or entry is skipped
//!   without dropping the rest of its document.
//!
//! # Invariants
//! - Adapters never interpret document contents beyond JSON decoding.
//! - Each `write_raw` call replaces the whole document atomically; there is
//!   no locking across a load-modify-store cycle, so two concurrent cycles
//!   can lose one update.

use crate::model::{ConfigDocument, ConfigMap, Organization};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, SCHEMA_VERSION};

pub type StoreResult<T> = Result<T, StoreError>;

/// Named documents managed by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentKind {
    Organizations,
    Configurations,
}

impl DocumentKind {
    /// Stable storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Configurations => "configurations",
        }
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence adapter failure.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Db(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Encode {
        kind: DocumentKind,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "store I/O failed at `{}`: {source}", path.display())
            }
            Self::Db(err) => write!(f, "store database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported version {latest_supported}"
            ),
            Self::Encode { kind, source } => {
                write!(f, "failed to encode {kind} document: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::Encode { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value)
    }
}

/// Whole-document persistence contract.
///
/// Implementors only move raw JSON text; typed loading and the lenient-read
/// policy live in the provided methods.
pub trait DocumentStore {
    /// Returns the stored text, or `None` when the document was never written.
    fn read_raw(&self, kind: DocumentKind) -> StoreResult<Option<String>>;

    /// Replaces the stored text.
    fn write_raw(&self, kind: DocumentKind, body: &str) -> StoreResult<()>;

    fn load_organizations(&self) -> StoreResult<Vec<Organization>> {
        let records: Vec<Value> = decode_lenient(
            DocumentKind::Organizations,
            self.read_raw(DocumentKind::Organizations)?,
        );
        Ok(records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                serde_json::from_value(record)
                    .map_err(|err| {
                        warn!(
                            "event=store_load module=store status=skipped kind=organizations index={index} error={err}"
                        );
                    })
                    .ok()
            })
            .collect())
    }

    fn store_organizations(&self, organizations: &[Organization]) -> StoreResult<()> {
        let body = encode(DocumentKind::Organizations, &organizations)?;
        self.write_raw(DocumentKind::Organizations, &body)
    }

    fn load_configurations(&self) -> StoreResult<ConfigMap> {
        let entries: Map<String, Value> = decode_lenient(
            DocumentKind::Configurations,
            self.read_raw(DocumentKind::Configurations)?,
        );
        Ok(entries
            .into_iter()
            .filter_map(|(key, entry)| match entry {
                Value::Object(object) => Some((key, ConfigDocument::from_object(object))),
                other => {
                    warn!(
                        "event=store_load module=store status=skipped kind=configurations key={key} found={}",
                        json_type(&other)
                    );
                    None
                }
            })
            .collect())
    }

    fn store_configurations(&self, configs: &ConfigMap) -> StoreResult<()> {
        let body = encode(DocumentKind::Configurations, configs)?;
        self.write_raw(DocumentKind::Configurations, &body)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    fn read_raw(&self, kind: DocumentKind) -> StoreResult<Option<String>> {
        (**self).read_raw(kind)
    }

    fn write_raw(&self, kind: DocumentKind, body: &str) -> StoreResult<()> {
        (**self).write_raw(kind, body)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn read_raw(&self, kind: DocumentKind) -> StoreResult<Option<String>> {
        (**self).read_raw(kind)
    }

    fn write_raw(&self, kind: DocumentKind, body: &str) -> StoreResult<()> {
        (**self).write_raw(kind, body)
    }
}

fn decode_lenient<T: DeserializeOwned + Default>(kind: DocumentKind, raw: Option<String>) -> T {
    let Some(raw) = raw else {
        debug!("event=store_load module=store status=empty kind={kind}");
        return T::default();
    };
    if raw.trim().is_empty() {
        return T::default();
    }

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=store_load module=store status=recovered kind={kind} bytes={} error={err}",
                raw.len()
            );
            T::default()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn encode<T: Serialize + ?Sized>(kind: DocumentKind, value: &T) -> StoreResult<String> {
    serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode { kind, source })
}
