//! Identity allocation and configuration merge rules.
//!
//! # Responsibility
//! - Allocate organization ids inside the reserved numeric band.
//! - Resolve effective configuration with fallback precedence.
//! - Merge partial configuration updates onto a base document.
//! - Register organizations explicitly or implicitly.
//!
//! # Invariants
//! - Functions here never perform I/O; callers load and persist documents.
//! - Failures are returned as `RegistryError`, never replaced by defaults.

use crate::model::OrgId;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod allocator;
pub mod merger;
pub mod registrar;
pub mod resolver;

pub use allocator::allocate_org_id;
pub use merger::{decode_config, merge_config};
pub use registrar::{create_explicit, ensure_exists, placeholder_name};
pub use resolver::resolve_config;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Error taxonomy for registry operations.
#[derive(Debug)]
pub enum RegistryError {
    /// Required input field is absent or blank.
    MissingField(&'static str),
    /// Another organization already uses this name.
    DuplicateName(String),
    /// No id is left in the allocator band.
    RangeExhausted,
    /// Incoming configuration could not be decoded into a document.
    InvalidConfigFormat(String),
    /// Referenced organization does not exist.
    NotFound(OrgId),
    /// Persistence adapter failure.
    Store(StoreError),
}

impl RegistryError {
    /// Transport status the request handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingField(_) | Self::InvalidConfigFormat(_) => 400,
            Self::DuplicateName(_) => 409,
            Self::RangeExhausted | Self::NotFound(_) | Self::Store(_) => 500,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::DuplicateName(_) => "duplicate_name",
            Self::RangeExhausted => "range_exhausted",
            Self::InvalidConfigFormat(_) => "invalid_config_format",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store_error",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::DuplicateName(name) => write!(f, "organization name already exists: {name}"),
            Self::RangeExhausted => write!(f, "organization id range exhausted"),
            Self::InvalidConfigFormat(details) => write!(f, "invalid config format: {details}"),
            Self::NotFound(id) => write!(f, "organization not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
