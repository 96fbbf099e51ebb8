//! Typed views over printer payloads
//!
//! Most endpoint payloads are consumed generically through the entity
//! catalog; the views here cover the fields the bridge itself needs for
//! device identity and camera access. Wire names (including the printer
//! firmware's own misspellings `nozzies_num` and `camerserver_URI`) are
//! preserved via serde renames.

use serde::{Deserialize, Serialize};

/// Raw payload of a printer endpoint, as returned inside the response envelope
pub type ApiData = serde_json::Map<String, serde_json::Value>;

/// Payload of GET `/printer/system`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "Serial_number", default)]
    pub serial_number: Option<String>,

    #[serde(default)]
    pub api_version: Option<String>,

    #[serde(default)]
    pub firmware_version: Option<String>,

    pub machine_id: String,

    #[serde(default)]
    pub machine_ip: Option<String>,

    #[serde(default)]
    pub machine_name: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(rename = "nozzies_num", default)]
    pub nozzles_num: Option<u32>,

    #[serde(default)]
    pub version: Option<String>,
}

impl SystemInfo {
    /// Parse from a raw endpoint payload
    pub fn from_data(data: &ApiData) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(data.clone()))
    }

    /// Software version string combining storage and API versions
    pub fn sw_version(&self) -> Option<String> {
        match (&self.version, &self.api_version) {
            (Some(version), Some(api_version)) => Some(format!("{version} / {api_version}")),
            (Some(version), None) => Some(version.clone()),
            (None, Some(api_version)) => Some(api_version.clone()),
            (None, None) => None,
        }
    }
}

/// Payload of GET `/printer/camera`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraInfo {
    /// Reported as a boolean or the strings "true"/"false" depending on firmware
    #[serde(default)]
    pub is_camera_connected: Option<serde_json::Value>,

    #[serde(rename = "camerserver_URI", default)]
    pub camera_server_uri: Option<String>,

    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl CameraInfo {
    /// Parse from a raw endpoint payload
    pub fn from_data(data: &ApiData) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(data.clone()))
    }

    /// Whether the camera is reported connected
    pub fn connected(&self) -> bool {
        match &self.is_camera_connected {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Port of the camera server, parsed from `camerserver_URI` (e.g. ":30/")
    pub fn camera_port(&self) -> Option<u16> {
        let uri = self.camera_server_uri.as_deref()?;
        let authority = uri.split('/').next()?;
        authority.strip_prefix(':')?.parse().ok()
    }
}
