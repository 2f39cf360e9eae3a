//! Organization identity records.
//!
//! # Responsibility
//! - Define `Organization` and the canonical `OrgId`.
//! - Normalize ids decoded from storage or request input.
//!
//! # Invariants
//! - `OrgId::Text` never holds a value that reads as an integral number when
//!   produced by `OrgId::parse` or deserialization.
//! - Numeric and text ids compare by canonical string form; opaque ids only
//!   equal an identical opaque id.
//! - Stored records are never rejected for an odd id or name; such values
//!   are kept so rewriting the list does not change them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Lowest id the allocator hands out.
pub const MIN_ORG_ID: i64 = 1_000_000_000_000;
/// Highest id the allocator hands out.
pub const MAX_ORG_ID: i64 = 1_999_999_999_999;

/// Largest float magnitude that still maps exactly onto an `i64`.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Organization identifier.
///
/// Ids allocated by the registry are always numeric. Auto-created records
/// keep whatever literal the caller supplied, so a text form is retained.
#[derive(Debug, Clone)]
pub enum OrgId {
    Numeric(i64),
    Text(String),
    /// Stored id that is neither an integral number nor a string, such as
    /// `null` or `1.5`. Written back exactly as read.
    Opaque(Value),
}

impl OrgId {
    /// Parses request or storage input into the canonical representation.
    ///
    /// Surrounding whitespace is ignored. Text that reads as an integral
    /// number (`42`, `42.0`, `4.2e1`) becomes `Numeric`; everything else is
    /// kept as literal text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::Numeric(value);
        }
        match trimmed.parse::<f64>().ok().and_then(integral) {
            Some(value) => Self::Numeric(value),
            None => Self::Text(trimmed.to_string()),
        }
    }

    /// Numeric view of the id, used for range checks.
    ///
    /// Text and opaque ids count when they read as a finite number;
    /// fractional values are floored.
    pub fn numeric_value(&self) -> Option<i64> {
        let float = match self {
            Self::Numeric(value) => return Some(*value),
            Self::Text(text) => text.parse::<f64>().ok(),
            Self::Opaque(value) => value.as_f64(),
        };
        float
            .filter(|value| value.is_finite() && value.abs() < MAX_EXACT_FLOAT)
            .map(|value| value.floor() as i64)
    }

    /// Returns whether the id lies inside the allocator band.
    pub fn is_in_allocator_range(&self) -> bool {
        self.numeric_value()
            .is_some_and(|value| (MIN_ORG_ID..=MAX_ORG_ID).contains(&value))
    }

    /// Key used for this id in the persisted configuration map.
    pub fn storage_key(&self) -> String {
        self.to_string()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl Display for OrgId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Opaque(value) => write!(f, "{value}"),
        }
    }
}

impl PartialEq for OrgId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Numeric(left), Self::Numeric(right)) => left == right,
            (Self::Opaque(left), Self::Opaque(right)) => left == right,
            (Self::Opaque(_), _) | (_, Self::Opaque(_)) => false,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for OrgId {}

impl Hash for OrgId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        matches!(self, Self::Opaque(_)).hash(state);
        self.to_string().hash(state);
    }
}

impl From<i64> for OrgId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for OrgId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Serialize for OrgId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(value) => serializer.serialize_i64(*value),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Opaque(value) => value.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOrgId {
    Int(i64),
    Text(String),
    Other(Value),
}

impl<'de> Deserialize<'de> for OrgId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawOrgId::deserialize(deserializer)? {
            RawOrgId::Int(value) => Self::Numeric(value),
            RawOrgId::Text(text) => Self::parse(&text),
            RawOrgId::Other(value) => match value.as_f64().and_then(integral) {
                Some(number) => Self::Numeric(number),
                None => Self::Opaque(value),
            },
        })
    }
}

fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_FLOAT)
        .then_some(value as i64)
}

fn missing_id() -> OrgId {
    OrgId::Opaque(Value::Null)
}

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => name,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Tenant identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(alias = "ORG_ID", default = "missing_id")]
    pub id: OrgId,
    #[serde(alias = "ORG_NAME", default, deserialize_with = "lenient_name")]
    pub name: String,
}

impl Organization {
    pub fn new(id: impl Into<OrgId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OrgId, Organization, MAX_ORG_ID, MIN_ORG_ID};

    #[test]
    fn parse_normalizes_numeric_text() {
        assert_eq!(
            OrgId::parse(" 1000000000000 "),
            OrgId::Numeric(1_000_000_000_000)
        );
        assert_eq!(OrgId::parse("acme-eu"), OrgId::Text("acme-eu".to_string()));
    }

    #[test]
    fn parse_coerces_integral_float_text() {
        assert_eq!(
            OrgId::parse("1000000000000.0"),
            OrgId::Numeric(1_000_000_000_000)
        );
        assert!(matches!(OrgId::parse("1e12"), OrgId::Numeric(1_000_000_000_000)));
        assert!(matches!(OrgId::parse("1000000000000.5"), OrgId::Text(_)));
        assert!(matches!(OrgId::parse("inf"), OrgId::Text(_)));
    }

    #[test]
    fn numeric_and_text_forms_compare_equal() {
        let numeric = OrgId::Numeric(1_000_000_000_000);
        let text = OrgId::Text("1000000000000".to_string());
        assert_eq!(numeric, text);
        assert_ne!(numeric, OrgId::Numeric(1_000_000_000_001));
    }

    #[test]
    fn deserialize_accepts_numbers_and_strings() {
        let from_number: OrgId = serde_json::from_str("1000000000000").unwrap();
        let from_string: OrgId = serde_json::from_str("\"1000000000000\"").unwrap();
        let from_float: OrgId = serde_json::from_str("1000000000000.0").unwrap();
        assert!(matches!(from_number, OrgId::Numeric(1_000_000_000_000)));
        assert!(matches!(from_string, OrgId::Numeric(1_000_000_000_000)));
        assert!(matches!(from_float, OrgId::Numeric(1_000_000_000_000)));

        let literal: OrgId = serde_json::from_str("\"legacy-7\"").unwrap();
        assert!(matches!(literal, OrgId::Text(ref text) if text == "legacy-7"));
    }

    #[test]
    fn serialize_keeps_numeric_ids_as_numbers() {
        let org = Organization::new(MIN_ORG_ID, "Acme");
        assert_eq!(
            serde_json::to_value(&org).unwrap(),
            serde_json::json!({ "id": 1_000_000_000_000i64, "name": "Acme" })
        );
        let literal = Organization::new("legacy-7", "Old");
        assert_eq!(
            serde_json::to_value(&literal).unwrap()["id"],
            serde_json::json!("legacy-7")
        );
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let org: Organization =
            serde_json::from_str(r#"{"ORG_ID": "1000000000004", "ORG_NAME": "Beta"}"#).unwrap();
        assert_eq!(org.id, OrgId::Numeric(1_000_000_000_004));
        assert_eq!(org.name, "Beta");
    }

    #[test]
    fn odd_stored_records_are_kept_verbatim() {
        let raw = serde_json::json!({ "id": null, "name": "Broken" });
        let org: Organization = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(org.id, OrgId::Opaque(serde_json::Value::Null));
        assert!(!org.id.is_in_allocator_range());
        assert_eq!(serde_json::to_value(&org).unwrap(), raw);

        let fractional: Organization =
            serde_json::from_str(r#"{"id": 1000000000000.5, "name": 7}"#).unwrap();
        assert_eq!(fractional.name, "7");
        assert_eq!(fractional.id.numeric_value(), Some(1_000_000_000_000));
        assert_ne!(fractional.id, OrgId::Numeric(1_000_000_000_000));

        let nameless: Organization = serde_json::from_str("{}").unwrap();
        assert_eq!(nameless.name, "");
        assert_ne!(nameless.id, OrgId::Text("null".to_string()));
    }

    #[test]
    fn range_check_uses_numeric_view() {
        assert!(OrgId::Numeric(MIN_ORG_ID).is_in_allocator_range());
        assert!(OrgId::Numeric(MAX_ORG_ID).is_in_allocator_range());
        assert!(!OrgId::Numeric(MAX_ORG_ID + 1).is_in_allocator_range());
        assert!(OrgId::Text("1.5e12".to_string()).is_in_allocator_range());
        assert!(!OrgId::Text("NaN".to_string()).is_in_allocator_range());
        assert!(!OrgId::Text("acme".to_string()).is_in_allocator_range());
    }
}
