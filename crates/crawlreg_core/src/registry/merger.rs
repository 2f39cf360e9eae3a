//! Partial configuration updates.

use super::{RegistryError, RegistryResult};
use crate::model::{ConfigDocument, ConfigPatch};
use serde_json::Value;

/// Decodes an encoded (JSON text) partial configuration.
///
/// # Errors
/// - `InvalidConfigFormat` when the text is not JSON or not an object.
pub fn decode_config(encoded: &str) -> RegistryResult<ConfigPatch> {
    match serde_json::from_str::<Value>(encoded) {
        Ok(Value::Object(object)) => Ok(ConfigPatch(object)),
        Ok(other) => Err(RegistryError::InvalidConfigFormat(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(err) => Err(RegistryError::InvalidConfigFormat(err.to_string())),
    }
}

/// Overlays `incoming` onto `existing` (or the hardcoded default).
///
/// Top-level keys of `incoming` replace same-named keys wholesale; nested
/// values are not merged recursively. Keys absent from `incoming` keep their
/// base value. A `null` clears a known setting. Values are not checked
/// against the known fields' types; mismatches are carried in `extra`.
///
/// # Errors
/// - `InvalidConfigFormat` only if the base document cannot be re-encoded.
pub fn merge_config(
    existing: Option<&ConfigDocument>,
    incoming: &ConfigPatch,
) -> RegistryResult<ConfigDocument> {
    let base = match existing {
        Some(doc) => doc.clone(),
        None => ConfigDocument::hardcoded_default(),
    };

    let mut object = base
        .to_object()
        .map_err(|err| RegistryError::InvalidConfigFormat(err.to_string()))?;
    for (key, value) in &incoming.0 {
        object.insert(key.clone(), value.clone());
    }

    Ok(ConfigDocument::from_object(object))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
