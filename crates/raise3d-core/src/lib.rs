//! Core types for the Raise3D bridge
//!
//! This crate provides the fundamental types used throughout the bridge:
//! Platform, EntityId, State, the printer's status enums, and typed views
//! over the payloads the printer reports.

mod entity_id;
mod payload;
mod platform;
mod state;
mod values;

pub use entity_id::{EntityId, EntityIdError};
pub use payload::{ApiData, CameraInfo, SystemInfo};
pub use platform::Platform;
pub use state::State;
pub use values::{normalize_value, slugify, JobAction, JobStatus, RunningStatus};

/// Integration domain used in identifiers and resource keys
pub const DOMAIN: &str = "raise3d";

/// Manufacturer reported in device identity
pub const MANUFACTURER: &str = "Raise3D";

/// State value for an entity whose value is not known yet
pub const STATE_UNKNOWN: &str = "unknown";

/// State value for an entity whose source endpoint is unreachable
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// Default port of the printer's HTTP API
pub const DEFAULT_PRINTER_PORT: u16 = 10800;

/// Default port of the printer's camera server
pub const DEFAULT_CAMERA_PORT: u16 = 30;

/// Default polling interval in seconds
pub const DEFAULT_SCAN_INTERVAL: u64 = 30;
