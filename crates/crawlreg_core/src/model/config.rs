//! Crawler configuration documents.
//!
//! # Responsibility
//! - Model the open-schema settings bag with typed known fields.
//! - Provide the hardcoded baseline served when nothing else applies.
//! - Model partial updates (`ConfigPatch`) as raw top-level key sets.
//!
//! # Invariants
//! - Any JSON object decodes. A known key whose value does not fit the
//!   typed field stays in `extra` under the same key, untouched.
//! - Absent known fields are omitted on the wire, never written as `null`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Persisted configuration collection keyed by canonical organization id.
///
/// Iteration order (ascending key) is the order used for fallback scans.
pub type ConfigMap = BTreeMap<String, ConfigDocument>;

const DEFAULT_USER_AGENT: &str = "crawlreg-bot/1.0";

/// Per-organization crawler settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Marks this document as usable as the process-wide fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    /// Requests allowed per throttle window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_request_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_window_seconds: Option<u64>,
    /// Link depth limit measured from the seed URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth_allowed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages_per_crawl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respect_robots_txt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_external_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_javascript: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Domain allow-list; empty means no restriction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_paths: Option<Vec<String>>,
    /// Unknown settings, plus known keys whose value has an unexpected type.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigDocument {
    /// Baseline configuration used when no stored fallback exists.
    pub fn hardcoded_default() -> Self {
        Self {
            is_default: Some(true),
            throttle_request_count: Some(50),
            throttle_window_seconds: Some(60),
            max_depth_allowed: Some(5),
            max_pages_per_crawl: Some(1000),
            respect_robots_txt: Some(true),
            follow_external_links: Some(false),
            render_javascript: Some(false),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            allowed_domains: Some(Vec::new()),
            blocked_paths: Some(Vec::new()),
            extra: Map::new(),
        }
    }

    /// Returns whether this document is flagged `isDefault: true`.
    pub fn is_fallback(&self) -> bool {
        self.is_default == Some(true)
    }

    /// Top-level JSON object form of this document.
    pub fn to_object(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(object) => Ok(object),
            _ => Ok(Map::new()),
        }
    }

    /// Builds a document from a JSON object without rejecting any value.
    ///
    /// `null` on a known key clears it; `null` on an unknown key is kept.
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        Self {
            is_default: take_known(&mut object, "isDefault"),
            throttle_request_count: take_known(&mut object, "throttleRequestCount"),
            throttle_window_seconds: take_known(&mut object, "throttleWindowSeconds"),
            max_depth_allowed: take_known(&mut object, "maxDepthAllowed"),
            max_pages_per_crawl: take_known(&mut object, "maxPagesPerCrawl"),
            respect_robots_txt: take_known(&mut object, "respectRobotsTxt"),
            follow_external_links: take_known(&mut object, "followExternalLinks"),
            render_javascript: take_known(&mut object, "renderJavascript"),
            user_agent: take_known(&mut object, "userAgent"),
            allowed_domains: take_known(&mut object, "allowedDomains"),
            blocked_paths: take_known(&mut object, "blockedPaths"),
            extra: object,
        }
    }
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_object)
    }
}

fn take_known<T: DeserializeOwned>(object: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = object.remove(key)?;
    if value.is_null() {
        return None;
    }
    match T::deserialize(&value) {
        Ok(typed) => Some(typed),
        Err(_) => {
            object.insert(key.to_string(), value);
            None
        }
    }
}

/// Incoming partial configuration: the top-level keys to overwrite.
///
/// `null` values are preserved so callers can clear a known setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigPatch(pub Map<String, Value>);
