//! Config entries and setup flow for the Raise3D bridge
//!
//! A config entry holds one printer's connection settings, keyed by the
//! printer's machine id so the same device cannot be added twice. Entries
//! persist in a versioned `.storage/` JSON file; the setup flow validates
//! settings by connecting before an entry is created.

mod entry;
mod flow;
mod manager;
mod printer_config;
mod storage;

pub use entry::{ConfigEntry, CONFIG_MINOR_VERSION, CONFIG_VERSION};
pub use flow::{
    ApiConfigValidator, ConfigFlow, ConfigValidator, FlowError, FlowResult, FormField,
    ABORT_ALREADY_CONFIGURED, ERROR_CONNECTION, ERROR_INVALID_PASSWORD,
};
pub use manager::{ConfigEntryError, ConfigEntryManager, ConfigEntryResult, STORAGE_KEY};
pub use printer_config::PrinterConfig;
pub use storage::{Storable, Storage, StorageError, StorageFile, StorageResult};
