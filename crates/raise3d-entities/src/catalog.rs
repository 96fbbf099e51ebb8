//! Catalog lookups shared by the platform binder and the service layer

use std::collections::HashMap;

use serde_json::{json, Value};

use raise3d_core::{Platform, MANUFACTURER, STATE_UNKNOWN};

use crate::binary_sensor::BINARY_SENSORS;
use crate::button::BUTTONS;
use crate::camera::CAMERAS;
use crate::command::Command;
use crate::number::NUMBERS;
use crate::sensor::SENSORS;

/// All catalog keys for a platform
pub fn keys_for_platform(platform: Platform) -> Vec<&'static str> {
    match platform {
        Platform::Sensor => SENSORS.iter().map(|d| d.key).collect(),
        Platform::BinarySensor => BINARY_SENSORS.iter().map(|d| d.key).collect(),
        Platform::Camera => CAMERAS.iter().map(|d| d.key).collect(),
        Platform::Number => NUMBERS.iter().map(|d| d.key).collect(),
        Platform::Button => BUTTONS.iter().map(|d| d.key).collect(),
    }
}

/// Resolve the command behind a number or button entity
pub fn find_command(platform: Platform, key: &str) -> Option<Command> {
    match platform {
        Platform::Number => NUMBERS.iter().find(|d| d.key == key).map(|d| d.command),
        Platform::Button => BUTTONS.iter().find(|d| d.key == key).map(|d| d.command),
        _ => None,
    }
}

/// Render a converted value as an entity state string
///
/// Booleans become the on/off convention of binary sensors.
pub fn state_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => STATE_UNKNOWN.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "on".to_string(),
        Some(Value::Bool(false)) => "off".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Static presentation attributes for a catalog entity
pub fn attributes_for(platform: Platform, key: &str) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();
    match platform {
        Platform::Sensor => {
            if let Some(desc) = SENSORS.iter().find(|d| d.key == key) {
                insert_opt(&mut attributes, "icon", desc.icon);
                insert_opt(&mut attributes, "device_class", desc.device_class);
                insert_opt(&mut attributes, "unit_of_measurement", desc.unit);
                if let Some(state_class) = desc.state_class {
                    attributes.insert("state_class".to_string(), json!(state_class.as_str()));
                }
                if let Some(category) = desc.entity_category {
                    attributes.insert("entity_category".to_string(), json!(category.as_str()));
                }
                if let Some(options) = desc.options {
                    attributes.insert("options".to_string(), json!(options));
                }
            }
        }
        Platform::BinarySensor => {
            if let Some(desc) = BINARY_SENSORS.iter().find(|d| d.key == key) {
                insert_opt(&mut attributes, "icon", desc.icon);
                insert_opt(&mut attributes, "device_class", desc.device_class);
                if let Some(category) = desc.entity_category {
                    attributes.insert("entity_category".to_string(), json!(category.as_str()));
                }
            }
        }
        Platform::Camera => {
            if CAMERAS.iter().any(|d| d.key == key) {
                attributes.insert("brand".to_string(), json!(MANUFACTURER));
            }
        }
        Platform::Number => {
            if let Some(desc) = NUMBERS.iter().find(|d| d.key == key) {
                insert_opt(&mut attributes, "icon", desc.icon);
                insert_opt(&mut attributes, "unit_of_measurement", desc.unit);
                attributes.insert("min".to_string(), json!(desc.min));
                attributes.insert("max".to_string(), json!(desc.max));
                attributes.insert("step".to_string(), json!(desc.step));
                attributes.insert("mode".to_string(), json!(desc.mode.as_str()));
            }
        }
        Platform::Button => {
            if let Some(desc) = BUTTONS.iter().find(|d| d.key == key) {
                insert_opt(&mut attributes, "icon", desc.icon);
            }
        }
    }
    attributes
}

fn insert_opt(attributes: &mut HashMap<String, Value>, name: &str, value: Option<&'static str>) {
    if let Some(value) = value {
        attributes.insert(name.to_string(), json!(value));
    }
}
