//! Per-organization crawler configuration registry.
//!
//! Organizations get collision-free ids from a reserved numeric band, and
//! their crawler settings are merged, resolved and persisted as two whole
//! documents behind a pluggable store.

pub mod action;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;
pub mod settings;
pub mod store;

pub use action::{dispatch, handle_form, ActionError, ActionRequest, ActionResponse};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    ConfigDocument, ConfigMap, ConfigPatch, OrgId, Organization, MAX_ORG_ID, MIN_ORG_ID,
};
pub use registry::{
    allocate_org_id, create_explicit, decode_config, ensure_exists, merge_config, resolve_config,
    RegistryError, RegistryResult,
};
pub use service::registry_service::RegistryService;
pub use settings::{RegistrySettings, SettingsError, StoreBackend};
pub use store::{
    DocumentKind, DocumentStore, JsonFileStore, MemoryStore, SqliteStore, StoreError, StoreResult,
    SCHEMA_VERSION,
};

/// Minimal health-check API for host probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
