//! Typed printer configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use raise3d_core::{DEFAULT_PRINTER_PORT, DEFAULT_SCAN_INTERVAL};

/// Validation errors for printer configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrinterConfigError {
    #[error("host cannot be empty")]
    EmptyHost,

    #[error("access password cannot be empty")]
    EmptyPassword,

    #[error("scan_interval must be at least 1 second")]
    ZeroScanInterval,
}

/// Connection settings for one printer, as collected by the config flow
///
/// Field names double as the config-flow form identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Printer hostname or IP address
    pub host: String,

    /// Port of the printer's HTTP API
    #[serde(default = "default_port")]
    pub conf_port: u16,

    /// Access password enabled in the printer's secure settings menu
    pub conf_password: String,

    /// Polling interval in seconds
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

fn default_port() -> u16 {
    DEFAULT_PRINTER_PORT
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL
}

impl PrinterConfig {
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            conf_port: DEFAULT_PRINTER_PORT,
            conf_password: password.into(),
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.conf_port = port;
        self
    }

    pub fn with_scan_interval(mut self, seconds: u64) -> Self {
        self.scan_interval = seconds;
        self
    }

    /// Check the settings are usable before trying to connect
    pub fn validate(&self) -> Result<(), PrinterConfigError> {
        if self.host.trim().is_empty() {
            return Err(PrinterConfigError::EmptyHost);
        }
        if self.conf_password.is_empty() {
            return Err(PrinterConfigError::EmptyPassword);
        }
        if self.scan_interval == 0 {
            return Err(PrinterConfigError::ZeroScanInterval);
        }
        Ok(())
    }
}
