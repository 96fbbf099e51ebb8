//! Entity platform identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::EntityIdError;

/// The entity platforms the bridge exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Sensor,
    BinarySensor,
    Camera,
    Number,
    Button,
}

impl Platform {
    /// All platforms, in setup order
    pub const ALL: [Platform; 5] = [
        Platform::Sensor,
        Platform::BinarySensor,
        Platform::Camera,
        Platform::Number,
        Platform::Button,
    ];

    /// The snake_case name used in entity ids and translation categories
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Sensor => "sensor",
            Platform::BinarySensor => "binary_sensor",
            Platform::Camera => "camera",
            Platform::Number => "number",
            Platform::Button => "button",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sensor" => Ok(Platform::Sensor),
            "binary_sensor" => Ok(Platform::BinarySensor),
            "camera" => Ok(Platform::Camera),
            "number" => Ok(Platform::Number),
            "button" => Ok(Platform::Button),
            _ => Err(EntityIdError::UnknownPlatform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_names() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_unknown_platform() {
        assert_eq!(
            "switch".parse::<Platform>().unwrap_err(),
            EntityIdError::UnknownPlatform
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Platform::BinarySensor).unwrap();
        assert_eq!(json, "\"binary_sensor\"");
        let parsed: Platform = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Platform::BinarySensor);
    }
}
