//! Runtime settings for hosts embedding the registry.
//!
//! # Responsibility
//! - Read store backend, data directory and logging options from the
//!   environment.
//! - Open the configured `DocumentStore`.
//!
//! # Invariants
//! - Settings parsing never touches the file system.
//! - Unknown backends and log levels are rejected, not defaulted.

use crate::logging::{default_log_level, normalize_level};
use crate::store::{DocumentStore, JsonFileStore, MemoryStore, SqliteStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_STORE: &str = "CRAWLREG_STORE";
pub const ENV_DATA_DIR: &str = "CRAWLREG_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "CRAWLREG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CRAWLREG_LOG_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const SQLITE_FILE_NAME: &str = "crawlreg.sqlite3";

/// Persistence backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self, SettingsError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(SettingsError::UnsupportedBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    UnsupportedBackend(String),
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedBackend(value) => write!(
                f,
                "unsupported store backend `{value}`; expected json|sqlite|memory"
            ),
            Self::InvalidLogLevel(message) => f.write_str(message),
            Self::RelativeLogDir(path) => write!(
                f,
                "{ENV_LOG_DIR} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for SettingsError {}

/// Resolved host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub log_level: &'static str,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Json,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl RegistrySettings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let mut settings = Self::default();

        if let Some(raw) = value(ENV_STORE) {
            settings.backend = StoreBackend::parse(&raw)?;
        }
        if let Some(raw) = value(ENV_DATA_DIR) {
            settings.data_dir = PathBuf::from(raw);
        }
        if let Some(raw) = value(ENV_LOG_LEVEL) {
            settings.log_level = normalize_level(&raw).map_err(SettingsError::InvalidLogLevel)?;
        }
        if let Some(raw) = value(ENV_LOG_DIR) {
            let path = PathBuf::from(raw);
            if !path.is_absolute() {
                return Err(SettingsError::RelativeLogDir(path));
            }
            settings.log_dir = Some(path);
        }

        Ok(settings)
    }

    /// SQLite database path used by the `sqlite` backend.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_FILE_NAME)
    }

    /// Opens the configured store.
    pub fn open_store(&self) -> Result<Box<dyn DocumentStore>, StoreError> {
        match self.backend {
            StoreBackend::Json => Ok(Box::new(JsonFileStore::open(&self.data_dir)?)),
            StoreBackend::Sqlite => {
                ensure_dir(&self.data_dir)?;
                Ok(Box::new(SqliteStore::open(self.sqlite_path())?))
            }
            StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
