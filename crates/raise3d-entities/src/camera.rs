//! Camera catalog

use crate::description::{CameraDescription, PollTarget};

/// All camera entities
pub const CAMERAS: &[CameraDescription] = &[CameraDescription {
    key: "camera",
    target: PollTarget::CameraInfo,
    connected_attribute: "is_camera_connected",
}];
