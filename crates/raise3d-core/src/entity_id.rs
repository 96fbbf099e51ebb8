//! Entity ID type representing a platform.object_id pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Platform;

/// Error type for invalid entity IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityIdError {
    #[error("entity_id must contain exactly one '.' separator")]
    InvalidFormat,

    #[error("platform is not one of sensor, binary_sensor, camera, number, button")]
    UnknownPlatform,

    #[error("object_id cannot be empty")]
    EmptyObjectId,

    #[error(
        "object_id contains invalid characters (must be lowercase alphanumeric with underscores, cannot start/end with underscore)"
    )]
    InvalidObjectIdChars,
}

/// Represents a bridge entity ID (e.g., "sensor.print_progress")
///
/// Entity IDs consist of a platform and an object_id separated by a period.
/// The object_id must be lowercase alphanumeric with underscores only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    platform: Platform,
    object_id: String,
}

impl EntityId {
    /// Create a new EntityId from a platform and object_id
    pub fn new(platform: Platform, object_id: impl Into<String>) -> Result<Self, EntityIdError> {
        let object_id = object_id.into();

        if object_id.is_empty() {
            return Err(EntityIdError::EmptyObjectId);
        }
        if !Self::is_valid_object_id(&object_id) {
            return Err(EntityIdError::InvalidObjectIdChars);
        }

        Ok(Self {
            platform,
            object_id,
        })
    }

    /// Get the platform part of the entity ID
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Get the object_id part of the entity ID
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Check if an object_id is valid (lowercase alphanumeric + underscore, cannot start/end with _)
    fn is_valid_object_id(s: &str) -> bool {
        if s.starts_with('_') || s.ends_with('_') {
            return false;
        }
        s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 2 {
            return Err(EntityIdError::InvalidFormat);
        }
        Self::new(parts[0].parse()?, parts[1])
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.platform, self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_entity_id() {
        let id = EntityId::new(Platform::Sensor, "print_progress").unwrap();
        assert_eq!(id.platform(), Platform::Sensor);
        assert_eq!(id.object_id(), "print_progress");
        assert_eq!(id.to_string(), "sensor.print_progress");
    }

    #[test]
    fn test_parse_entity_id() {
        let id: EntityId = "button.job_action_pause".parse().unwrap();
        assert_eq!(id.platform(), Platform::Button);
        assert_eq!(id.object_id(), "job_action_pause");
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(
            "no_separator".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidFormat
        );
        assert_eq!(
            "too.many.parts".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidFormat
        );
    }

    #[test]
    fn test_unknown_platform() {
        assert_eq!(
            "switch.thing".parse::<EntityId>().unwrap_err(),
            EntityIdError::UnknownPlatform
        );
    }

    #[test]
    fn test_empty_object_id() {
        assert_eq!(
            "sensor.".parse::<EntityId>().unwrap_err(),
            EntityIdError::EmptyObjectId
        );
    }

    #[test]
    fn test_invalid_chars() {
        assert_eq!(
            "sensor.UPPER".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidObjectIdChars
        );
        assert_eq!(
            "sensor._leading".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidObjectIdChars
        );
        assert_eq!(
            "sensor.trailing_".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidObjectIdChars
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = EntityId::new(Platform::Number, "heatbed_tar_temp").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"number.heatbed_tar_temp\"");

        let parsed: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
