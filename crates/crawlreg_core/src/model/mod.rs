//! Domain model for organizations and their crawler configuration.
//!
//! # Responsibility
//! - Define the persisted shapes of organization records and configuration
//!   documents.
//! - Own the canonical organization id representation and its equality rule.
//!
//! # Invariants
//! - Organization ids compare by canonical string form, so numeric and
//!   string encodings of the same number are one id.
//! - Configuration documents keep unknown keys verbatim.

pub mod config;
pub mod org;

pub use config::{ConfigDocument, ConfigMap, ConfigPatch};
pub use org::{OrgId, Organization, MAX_ORG_ID, MIN_ORG_ID};
