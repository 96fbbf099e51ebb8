//! Config entry manager
//!
//! In-memory indexes over the persisted entry list. Every mutation saves
//! immediately; duplicate machine ids are rejected at add time.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::entry::{ConfigEntry, CONFIG_MINOR_VERSION, CONFIG_VERSION};
use crate::printer_config::PrinterConfig;
use crate::storage::{Storable, Storage, StorageError, StorageFile, StorageResult};

/// Storage key for config entries
pub const STORAGE_KEY: &str = "raise3d.config_entries";

/// Config entry errors
#[derive(Debug, Error)]
pub enum ConfigEntryError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("A printer with machine id {unique_id} is already configured")]
    AlreadyConfigured { unique_id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type ConfigEntryResult<T> = Result<T, ConfigEntryError>;

/// Config entries data for storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigEntriesData {
    entries: Vec<ConfigEntry>,
}

impl Storable for ConfigEntriesData {
    const KEY: &'static str = STORAGE_KEY;
    const VERSION: u32 = CONFIG_VERSION;
    const MINOR_VERSION: u32 = CONFIG_MINOR_VERSION;
}

/// Manages the lifecycle of config entries
pub struct ConfigEntryManager {
    storage: Arc<Storage>,

    /// Primary index: entry_id -> ConfigEntry
    entries: DashMap<String, ConfigEntry>,

    /// Index: unique_id -> entry_id
    by_unique_id: DashMap<String, String>,
}

impl ConfigEntryManager {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            entries: DashMap::new(),
            by_unique_id: DashMap::new(),
        }
    }

    /// Load entries from storage
    pub async fn load(&self) -> StorageResult<()> {
        if let Some(storage_file) = self
            .storage
            .load::<ConfigEntriesData>(STORAGE_KEY)
            .await?
        {
            info!(
                "Loading {} config entries from storage (v{}.{})",
                storage_file.data.entries.len(),
                storage_file.version,
                storage_file.minor_version
            );

            for entry in storage_file.data.entries {
                self.index_entry(entry);
            }
        }
        Ok(())
    }

    /// Save entries to storage
    pub async fn save(&self) -> StorageResult<()> {
        let data = ConfigEntriesData {
            entries: self.entries.iter().map(|r| r.value().clone()).collect(),
        };
        let storage_file =
            StorageFile::new(STORAGE_KEY, data, CONFIG_VERSION, CONFIG_MINOR_VERSION);
        self.storage.save(&storage_file).await?;
        debug!("Saved {} config entries to storage", self.entries.len());
        Ok(())
    }

    fn index_entry(&self, entry: ConfigEntry) {
        self.by_unique_id
            .insert(entry.unique_id.clone(), entry.entry_id.clone());
        self.entries.insert(entry.entry_id.clone(), entry);
    }

    fn unindex_entry(&self, entry: &ConfigEntry) {
        self.by_unique_id.remove(&entry.unique_id);
        self.entries.remove(&entry.entry_id);
    }

    /// Get an entry by ID
    pub fn get(&self, entry_id: &str) -> Option<ConfigEntry> {
        self.entries.get(entry_id).map(|r| r.value().clone())
    }

    /// Get an entry by the printer's machine id
    pub fn get_by_unique_id(&self, unique_id: &str) -> Option<ConfigEntry> {
        self.by_unique_id
            .get(unique_id)
            .and_then(|entry_id| self.get(&entry_id))
    }

    /// Add a new config entry
    pub async fn add(&self, entry: ConfigEntry) -> ConfigEntryResult<ConfigEntry> {
        if self.get_by_unique_id(&entry.unique_id).is_some() {
            return Err(ConfigEntryError::AlreadyConfigured {
                unique_id: entry.unique_id.clone(),
            });
        }

        self.index_entry(entry.clone());
        self.save().await?;

        info!(
            "Added config entry: {} [{}] for machine {}",
            entry.title, entry.entry_id, entry.unique_id
        );

        Ok(entry)
    }

    /// Replace an entry's connection settings
    pub async fn update_data(
        &self,
        entry_id: &str,
        data: PrinterConfig,
    ) -> ConfigEntryResult<ConfigEntry> {
        let mut entry = self
            .get(entry_id)
            .ok_or_else(|| ConfigEntryError::NotFound(entry_id.to_string()))?;

        entry.data = data;
        entry.modified_at = Utc::now();

        self.index_entry(entry.clone());
        self.save().await?;

        debug!("Updated config entry: {}", entry_id);
        Ok(entry)
    }

    /// Remove an entry
    pub async fn remove(&self, entry_id: &str) -> ConfigEntryResult<ConfigEntry> {
        let entry = self
            .get(entry_id)
            .ok_or_else(|| ConfigEntryError::NotFound(entry_id.to_string()))?;

        self.unindex_entry(&entry);
        self.save().await?;

        info!("Removed config entry: {} [{}]", entry.title, entry_id);
        Ok(entry)
    }

    /// All entries
    pub fn all(&self) -> Vec<ConfigEntry> {
        self.entries.iter().map(|r| r.value().clone()).collect()
    }

    /// All entry IDs
    pub fn entry_ids(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_entry(unique_id: &str) -> ConfigEntry {
        ConfigEntry::new(
            format!("Printer {unique_id}"),
            PrinterConfig::new("192.168.1.50", "pw"),
            unique_id,
        )
    }

    fn create_test_manager() -> (TempDir, ConfigEntryManager) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::new(temp_dir.path()));
        (temp_dir, ConfigEntryManager::new(storage))
    }

    #[tokio::test]
    async fn test_add_entry() {
        let (_dir, manager) = create_test_manager();

        let added = manager.add(test_entry("machine-1")).await.unwrap();
        assert_eq!(added.unique_id, "machine-1");
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_machine_id_rejected() {
        let (_dir, manager) = create_test_manager();

        manager.add(test_entry("machine-1")).await.unwrap();
        let result = manager.add(test_entry("machine-1")).await;

        assert!(matches!(
            result,
            Err(ConfigEntryError::AlreadyConfigured { .. })
        ));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_unique_id() {
        let (_dir, manager) = create_test_manager();

        manager.add(test_entry("machine-1")).await.unwrap();
        manager.add(test_entry("machine-2")).await.unwrap();

        let entry = manager.get_by_unique_id("machine-2").unwrap();
        assert_eq!(entry.title, "Printer machine-2");
        assert!(manager.get_by_unique_id("machine-3").is_none());
    }

    #[tokio::test]
    async fn test_update_data() {
        let (_dir, manager) = create_test_manager();

        let entry = manager.add(test_entry("machine-1")).await.unwrap();
        let updated = manager
            .update_data(
                &entry.entry_id,
                PrinterConfig::new("10.0.0.9", "new-pw").with_scan_interval(10),
            )
            .await
            .unwrap();

        assert_eq!(updated.data.host, "10.0.0.9");
        assert_eq!(updated.data.scan_interval, 10);
    }

    #[tokio::test]
    async fn test_remove_entry() {
        let (_dir, manager) = create_test_manager();

        let entry = manager.add(test_entry("machine-1")).await.unwrap();
        manager.remove(&entry.entry_id).await.unwrap();

        assert!(manager.is_empty());
        assert!(manager.get_by_unique_id("machine-1").is_none());

        let result = manager.remove(&entry.entry_id).await;
        assert!(matches!(result, Err(ConfigEntryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::new(temp_dir.path()));

        {
            let manager = ConfigEntryManager::new(storage.clone());
            manager.add(test_entry("machine-1")).await.unwrap();
        }

        {
            let manager = ConfigEntryManager::new(storage);
            manager.load().await.unwrap();

            assert_eq!(manager.len(), 1);
            let entry = manager.get_by_unique_id("machine-1").unwrap();
            assert_eq!(entry.data.host, "192.168.1.50");
        }
    }
}
