//! Device identity derived from system info

use serde::{Deserialize, Serialize};

use raise3d_core::{SystemInfo, DOMAIN, MANUFACTURER};

/// Identity of the printer behind a config entry
///
/// Fetched once at setup; a configuration reload refreshes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// (domain, machine_id) pair identifying the device
    pub identifiers: (String, String),
    pub manufacturer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
}

impl DeviceInfo {
    pub fn from_system_info(info: &SystemInfo) -> Self {
        Self {
            identifiers: (DOMAIN.to_string(), info.machine_id.clone()),
            manufacturer: MANUFACTURER.to_string(),
            name: non_empty(info.machine_name.clone()),
            model: non_empty(info.model.clone()),
            serial_number: non_empty(info.serial_number.clone()),
            sw_version: info.sw_version(),
            hw_version: non_empty(info.firmware_version.clone()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
