//! Translation strings for the Raise3D bridge
//!
//! Loads and caches the embedded `strings.json` manifest: config-flow
//! field labels, error/abort messages, and entity display names grouped
//! by platform. Lookups fall back to the raw identifier when no entry
//! exists, matching the usual translation-resolution behavior.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::warn;

use raise3d_core::{Platform, DOMAIN};

/// The embedded translation manifest
const STRINGS_JSON: &str = include_str!("strings.json");

/// Cached parsed manifest - loaded once on first access
static MANIFEST: OnceLock<Value> = OnceLock::new();

fn manifest() -> &'static Value {
    MANIFEST.get_or_init(|| match serde_json::from_str(STRINGS_JSON) {
        Ok(value) => value,
        Err(err) => {
            warn!("Failed to parse embedded strings.json: {}", err);
            Value::Object(Default::default())
        }
    })
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for part in path {
        current = current.get(part)?;
    }
    current.as_str()
}

/// Display name of an entity, if one is defined
pub fn entity_name(platform: Platform, key: &str) -> Option<&'static str> {
    lookup(manifest(), &["entity", platform.as_str(), key, "name"])
}

/// Display name of an entity, falling back to the raw identifier
pub fn entity_label(platform: Platform, key: &str) -> String {
    entity_name(platform, key)
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

/// Label of a config-flow form field
pub fn config_field_label(field: &str) -> Option<&'static str> {
    lookup(manifest(), &["config", "step", "user", "data", field])
}

/// Message for a config-flow field error
pub fn error_message(reason: &str) -> Option<&'static str> {
    lookup(manifest(), &["config", "error", reason])
}

/// Message for a config-flow abort reason
pub fn abort_reason(reason: &str) -> Option<&'static str> {
    lookup(manifest(), &["config", "abort", reason])
}

/// All entity keys defined for a platform
pub fn entity_keys(platform: Platform) -> Vec<String> {
    manifest()
        .get("entity")
        .and_then(|e| e.get(platform.as_str()))
        .and_then(Value::as_object)
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

/// Flatten the manifest into dot-notation resource keys
///
/// Keys take the form `component.raise3d.entity.sensor.print_progress.name`.
pub fn resources() -> HashMap<String, String> {
    let mut output = HashMap::new();
    flatten(manifest(), &format!("component.{DOMAIN}"), &mut output);
    output
}

fn flatten(value: &Value, prefix: &str, output: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten(val, &format!("{prefix}.{key}"), output);
            }
        }
        Value::String(s) => {
            output.insert(prefix.to_string(), s.clone());
        }
        _ => {}
    }
}
