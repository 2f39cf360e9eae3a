//! Organization id allocation.

use super::{RegistryError, RegistryResult};
use crate::model::{OrgId, Organization, MAX_ORG_ID, MIN_ORG_ID};

/// Computes the next unused id inside `[MIN_ORG_ID, MAX_ORG_ID]`.
///
/// Only ids whose numeric view falls inside the band are considered, so
/// auto-created records with out-of-band or literal ids never move the
/// cursor. The result is a pure function of `organizations`; callers that
/// retry after a failed write must reload the list first.
///
/// # Errors
/// - `RangeExhausted` when the band's highest id is already taken.
pub fn allocate_org_id(organizations: &[Organization]) -> RegistryResult<OrgId> {
    let highest = organizations
        .iter()
        .filter_map(|org| org.id.numeric_value())
        .filter(|value| (MIN_ORG_ID..=MAX_ORG_ID).contains(value))
        .max()
        .unwrap_or(MIN_ORG_ID - 1);

    let candidate = highest + 1;
    if candidate > MAX_ORG_ID {
        return Err(RegistryError::RangeExhausted);
    }
    Ok(OrgId::Numeric(candidate))
}

#[cfg(test)]
mod tests {
    use super::allocate_org_id;
    use crate::model::{OrgId, Organization, MAX_ORG_ID, MIN_ORG_ID};
    use crate::registry::RegistryError;

    #[test]
    fn empty_list_starts_at_band_floor() {
        assert_eq!(allocate_org_id(&[]).unwrap(), OrgId::Numeric(MIN_ORG_ID));
    }

    #[test]
    fn next_id_follows_highest_in_band_id() {
        let orgs = vec![
            Organization::new(MIN_ORG_ID + 7, "b"),
            Organization::new(MIN_ORG_ID, "a"),
            Organization::new(MIN_ORG_ID + 3, "c"),
        ];
        assert_eq!(
            allocate_org_id(&orgs).unwrap(),
            OrgId::Numeric(MIN_ORG_ID + 8)
        );
    }

    #[test]
    fn out_of_band_and_literal_ids_are_ignored() {
        let orgs = vec![
            Organization::new(2_000_000_000_000i64, "above"),
            Organization::new(42i64, "below"),
            Organization::new("legacy", "text"),
            Organization::new(MIN_ORG_ID + 1, "in band"),
        ];
        assert_eq!(
            allocate_org_id(&orgs).unwrap(),
            OrgId::Numeric(MIN_ORG_ID + 2)
        );
    }

    #[test]
    fn text_ids_in_band_count_as_numbers() {
        let orgs = vec![Organization {
            id: OrgId::Text("1.0000000000055e12".to_string()),
            name: "float".to_string(),
        }];
        let next = allocate_org_id(&orgs).unwrap();
        assert_eq!(next, OrgId::Numeric(1_000_000_000_006));
    }

    #[test]
    fn allocation_is_deterministic() {
        let orgs = vec![Organization::new(MIN_ORG_ID + 11, "x")];
        assert_eq!(allocate_org_id(&orgs).unwrap(), allocate_org_id(&orgs).unwrap());
    }

    #[test]
    fn band_ceiling_exhausts_allocation() {
        let orgs = vec![Organization::new(MAX_ORG_ID, "last")];
        assert!(matches!(
            allocate_org_id(&orgs),
            Err(RegistryError::RangeExhausted)
        ));
    }
}
