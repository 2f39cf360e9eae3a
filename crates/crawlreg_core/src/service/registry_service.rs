//! Organization and configuration use-cases.
//!
//! # Responsibility
//! - Orchestrate registry rules against a `DocumentStore`.
//! - Keep the organization list and configuration map consistent.
//!
//! # Invariants
//! - Input, uniqueness and merge failures are detected before any write.
//! - Configuration writes never create duplicate organization records.
//! - Each operation is one unlocked load-modify-store cycle; concurrent
//!   writers can overwrite each other's changes.

use crate::model::{ConfigDocument, OrgId, Organization};
use crate::registry::resolver::find_entry;
use crate::registry::{
    create_explicit, decode_config, ensure_exists, merge_config, resolve_config, RegistryError,
    RegistryResult,
};
use crate::store::DocumentStore;
use log::{error, info, warn};
use std::time::Instant;

/// Registry use-case service.
pub struct RegistryService<S: DocumentStore> {
    store: S,
    hardcoded_default: ConfigDocument,
}

impl<S: DocumentStore> RegistryService<S> {
    /// Creates a service over `store` using the built-in baseline config.
    pub fn new(store: S) -> Self {
        Self::with_default(store, ConfigDocument::hardcoded_default())
    }

    /// Creates a service with a caller-provided baseline config.
    pub fn with_default(store: S, hardcoded_default: ConfigDocument) -> Self {
        Self {
            store,
            hardcoded_default,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns every stored organization in stored order.
    pub fn list_organizations(&self) -> RegistryResult<Vec<Organization>> {
        observe("org_list", || Ok(self.store.load_organizations()?))
    }

    /// Registers a new organization under a freshly allocated id.
    pub fn create_organization(&self, name: &str) -> RegistryResult<Organization> {
        observe("org_create", || {
            let mut organizations = self.store.load_organizations()?;
            let created = create_explicit(name, &organizations)?;
            organizations.push(created.clone());
            self.store.store_organizations(&organizations)?;
            info!(
                "event=org_create module=service status=created org_id={}",
                created.id
            );
            Ok(created)
        })
    }

    /// Returns the effective configuration for an existing organization.
    ///
    /// # Errors
    /// - `MissingField("orgId")` for an empty id.
    /// - `NotFound` when no organization has this id.
    pub fn get_organization_config(&self, org_id: &OrgId) -> RegistryResult<ConfigDocument> {
        observe("config_get", || {
            require_id(org_id)?;
            let organizations = self.store.load_organizations()?;
            if !organizations.iter().any(|org| org.id == *org_id) {
                return Err(RegistryError::NotFound(org_id.clone()));
            }
            let configs = self.store.load_configurations()?;
            Ok(resolve_config(org_id, &configs, &self.hardcoded_default))
        })
    }

    /// Merges an encoded partial config into the organization's document.
    ///
    /// The organization is auto-created when unknown, named `name` or a
    /// placeholder. Decoding and merging run before any write.
    pub fn upsert_organization_config(
        &self,
        org_id: &OrgId,
        encoded_config: &str,
        name: Option<&str>,
    ) -> RegistryResult<ConfigDocument> {
        observe("config_upsert", || {
            require_id(org_id)?;
            if encoded_config.trim().is_empty() {
                return Err(RegistryError::MissingField("config"));
            }
            let patch = decode_config(encoded_config)?;

            let mut configs = self.store.load_configurations()?;
            let merged = merge_config(find_entry(org_id, &configs), &patch)?;

            let mut organizations = self.store.load_organizations()?;
            if let Some(created) = ensure_exists(org_id, &organizations, name) {
                info!(
                    "event=org_autocreate module=service status=created org_id={}",
                    created.id
                );
                organizations.push(created);
                self.store.store_organizations(&organizations)?;
            }

            configs.retain(|key, _| OrgId::parse(key) != *org_id);
            configs.insert(org_id.storage_key(), merged.clone());
            self.store.store_configurations(&configs)?;
            Ok(merged)
        })
    }
}

fn require_id(org_id: &OrgId) -> RegistryResult<()> {
    if org_id.is_empty() {
        return Err(RegistryError::MissingField("orgId"));
    }
    Ok(())
}

fn observe<T>(event: &str, op: impl FnOnce() -> RegistryResult<T>) -> RegistryResult<T> {
    let started_at = Instant::now();
    let result = op();
    match &result {
        Ok(_) => info!(
            "event={event} module=service status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) if err.status_code() >= 500 => error!(
            "event={event} module=service status=error duration_ms={} error_code={} error={err}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=service status=rejected duration_ms={} error_code={} error={err}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    result
}
