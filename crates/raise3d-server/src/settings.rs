//! Bridge settings
//!
//! Loaded from a YAML file; every field has a sensible default so a
//! missing file just means defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Daemon-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Address the REST API listens on
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Directory holding the `.storage/` state
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// tracing env-filter directive (e.g. "info", "raise3d_api=debug")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_listen() -> String {
    "127.0.0.1:8123".to_string()
}

fn default_config_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            config_dir: default_config_dir(),
            log_filter: default_log_filter(),
        }
    }
}

impl BridgeSettings {
    /// Load settings from a YAML file, falling back to defaults when the
    /// file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!(?path, "Settings file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("parsing settings file {}", path.display()))
    }
}
