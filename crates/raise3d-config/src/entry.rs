//! Config entry type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::printer_config::PrinterConfig;

/// Current config entry schema version
pub const CONFIG_VERSION: u32 = 2;
/// Current minor schema version
pub const CONFIG_MINOR_VERSION: u32 = 2;

/// One configured printer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique identifier (ULID)
    pub entry_id: String,

    /// Human-readable display name, usually the printer's machine name
    pub title: String,

    /// Connection settings
    pub data: PrinterConfig,

    /// Printer machine id, used for duplicate prevention
    pub unique_id: String,

    /// Major schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Minor schema version
    #[serde(default = "default_minor_version")]
    pub minor_version: u32,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_minor_version() -> u32 {
    CONFIG_MINOR_VERSION
}

impl ConfigEntry {
    /// Create a new config entry
    pub fn new(
        title: impl Into<String>,
        data: PrinterConfig,
        unique_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            entry_id: ulid::Ulid::new().to_string(),
            title: title.into(),
            data,
            unique_id: unique_id.into(),
            version: CONFIG_VERSION,
            minor_version: CONFIG_MINOR_VERSION,
            created_at: now,
            modified_at: now,
        }
    }
}
