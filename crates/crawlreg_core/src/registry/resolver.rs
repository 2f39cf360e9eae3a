//! Effective configuration lookup.

use crate::model::{ConfigDocument, ConfigMap, OrgId};

/// Returns the configuration that applies to `org_id`.
///
/// Precedence:
/// 1. the organization's own entry;
/// 2. the first stored document flagged `isDefault: true`, in map order;
/// 3. `hardcoded_default`.
///
/// The caller must have checked that the organization exists.
pub fn resolve_config(
    org_id: &OrgId,
    configs: &ConfigMap,
    hardcoded_default: &ConfigDocument,
) -> ConfigDocument {
    if let Some(doc) = find_entry(org_id, configs) {
        return doc.clone();
    }

    configs
        .values()
        .find(|doc| doc.is_fallback())
        .unwrap_or(hardcoded_default)
        .clone()
}

/// Looks up the entry stored for `org_id`.
///
/// Keys written by older tooling may not be canonical (for example with
/// leading zeros), so a miss on the canonical key falls back to comparing
/// parsed keys.
pub fn find_entry<'a>(org_id: &OrgId, configs: &'a ConfigMap) -> Option<&'a ConfigDocument> {
    configs.get(org_id.storage_key().as_str()).or_else(|| {
        configs
            .iter()
            .find(|(key, _)| OrgId::parse(key) == *org_id)
            .map(|(_, doc)| doc)
    })
}
