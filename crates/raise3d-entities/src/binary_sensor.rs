//! Binary sensor catalog

use crate::convert::ValueConverter;
use crate::description::{BinarySensorDescription, EntityCategory, PollTarget};

/// All binary sensor entities
pub const BINARY_SENSORS: &[BinarySensorDescription] = &[BinarySensorDescription {
    key: "is_camera_connected",
    target: PollTarget::CameraInfo,
    attribute: "is_camera_connected",
    converter: ValueConverter::BoolLike,
    icon: Some("mdi:webcam"),
    icon_off: Some("mdi:webcam-off"),
    device_class: Some("presence"),
    entity_category: Some(EntityCategory::Diagnostic),
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_presence_sensor() {
        assert_eq!(BINARY_SENSORS.len(), 1);
        let desc = &BINARY_SENSORS[0];
        assert_eq!(desc.key, "is_camera_connected");
        assert_eq!(desc.converter, ValueConverter::BoolLike);
        assert_eq!(desc.target, PollTarget::CameraInfo);
    }
}
