//! Organization registration.
//!
//! # Invariants
//! - Explicit creation enforces non-empty, unique names and allocated ids.
//! - Implicit creation (first configuration write for an unseen id) keeps
//!   the caller's id and skips both checks. Records that break the id band
//!   or name uniqueness are reported through `warn` events.

use super::allocator::allocate_org_id;
use super::{RegistryError, RegistryResult};
use crate::model::{OrgId, Organization};
use log::warn;

/// Creates a new organization with an allocated id.
///
/// The returned record is not yet persisted; the caller appends it to the
/// organization list and stores the list.
///
/// # Errors
/// - `MissingField("name")` when `name` is blank.
/// - `DuplicateName` when another organization has exactly this name.
/// - `RangeExhausted` from the allocator.
pub fn create_explicit(name: &str, organizations: &[Organization]) -> RegistryResult<Organization> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistryError::MissingField("name"));
    }
    if organizations.iter().any(|org| org.name == name) {
        return Err(RegistryError::DuplicateName(name.to_string()));
    }

    let id = allocate_org_id(organizations)?;
    Ok(Organization {
        id,
        name: name.to_string(),
    })
}

/// Returns the record to append when `org_id` is not registered yet.
///
/// `None` means the organization already exists and nothing changes.
pub fn ensure_exists(
    org_id: &OrgId,
    organizations: &[Organization],
    supplied_name: Option<&str>,
) -> Option<Organization> {
    if organizations.iter().any(|org| org.id == *org_id) {
        return None;
    }

    let name = supplied_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_name(org_id));

    let range_ok = org_id.is_in_allocator_range();
    let name_unique = !organizations.iter().any(|org| org.name == name);
    if !range_ok || !name_unique {
        warn!(
            "event=org_autocreate module=registry status=inconsistent org_id={} range_ok={} name_unique={}",
            org_id, range_ok, name_unique
        );
    }

    Some(Organization {
        id: org_id.clone(),
        name,
    })
}

/// Name given to organizations created without an explicit name.
pub fn placeholder_name(org_id: &OrgId) -> String {
    format!("Organization {org_id}")
}

#[cfg(test)]
mod tests {
    use super::{create_explicit, ensure_exists, placeholder_name};
    use crate::model::{OrgId, Organization, MAX_ORG_ID, MIN_ORG_ID};
    use crate::registry::RegistryError;

    #[test]
    fn create_allocates_next_id() {
        let orgs = vec![Organization::new(MIN_ORG_ID, "Acme")];
        let created = create_explicit("Globex", &orgs).unwrap();
        assert_eq!(created.id, OrgId::Numeric(MIN_ORG_ID + 1));
        assert_eq!(created.name, "Globex");
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = create_explicit("   ", &[]).unwrap_err();
        assert!(matches!(err, RegistryError::MissingField("name")));
    }

    #[test]
    fn create_rejects_duplicate_name_case_sensitively() {
        let orgs = vec![Organization::new(MIN_ORG_ID, "Acme")];
        let err = create_explicit("Acme", &orgs).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(ref name) if name == "Acme"));

        assert!(create_explicit("acme", &orgs).is_ok());
    }

    #[test]
    fn create_surfaces_range_exhaustion() {
        let orgs = vec![Organization::new(MAX_ORG_ID, "Last")];
        assert!(matches!(
            create_explicit("Next", &orgs),
            Err(RegistryError::RangeExhausted)
        ));
    }

    #[test]
    fn ensure_exists_is_noop_for_known_id_in_either_form() {
        let orgs = vec![Organization::new(MIN_ORG_ID, "Acme")];
        assert!(ensure_exists(&OrgId::Numeric(MIN_ORG_ID), &orgs, None).is_none());
        assert!(ensure_exists(&OrgId::parse("1000000000000"), &orgs, Some("Other")).is_none());
    }

    #[test]
    fn ensure_exists_synthesizes_record_with_placeholder_name() {
        let id = OrgId::parse("2000000000000");
        let created = ensure_exists(&id, &[], None).unwrap();
        assert_eq!(created.id, OrgId::Numeric(2_000_000_000_000));
        assert_eq!(created.name, placeholder_name(&id));
        assert_eq!(created.name, "Organization 2000000000000");
    }

    #[test]
    fn ensure_exists_keeps_literal_ids_and_supplied_names() {
        let id = OrgId::parse("tenant-eu");
        let created = ensure_exists(&id, &[], Some(" EU Tenant ")).unwrap();
        assert_eq!(created.id, OrgId::Text("tenant-eu".to_string()));
        assert_eq!(created.name, "EU Tenant");
    }

    #[test]
    fn ensure_exists_does_not_enforce_name_uniqueness() {
        let orgs = vec![Organization::new(MIN_ORG_ID, "Acme")];
        let created = ensure_exists(&OrgId::Numeric(MIN_ORG_ID + 5), &orgs, Some("Acme")).unwrap();
        assert_eq!(created.name, "Acme");
    }
}
