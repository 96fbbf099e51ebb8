//! The bridge aggregate
//!
//! Owns the shared bus and store, the config entry manager and flow, and
//! one runtime per loaded entry: the API client, its coordinators, the
//! platform binding tasks and the camera client. Commands resolve through
//! the entity bindings back to the owning runtime.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use raise3d_api::{ApiError, CameraClient, PrinterClient};
use raise3d_config::{
    ApiConfigValidator, ConfigEntry, ConfigEntryError, ConfigEntryManager, ConfigFlow, Storage,
};
use raise3d_coordinator::{bind_platforms, CoordinatorSet, DataFetcher};
use raise3d_core::{
    slugify, CameraInfo, EntityId, Platform, SystemInfo, DEFAULT_CAMERA_PORT,
};
use raise3d_entities::{find_command, keys_for_platform, CommandError, DeviceInfo};
use raise3d_state::{EventBus, SharedEventBus, SharedStateStore, StateStore};

use crate::services::{ServiceCall, ServiceError, ServiceRegistry, ServiceResult};

/// Delay before refreshing after a committing command; the printer needs a
/// moment before it reports the new target values.
const COMMAND_SETTLE: Duration = Duration::from_millis(1500);

/// Bridge-level errors
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("entity {0} does not accept commands")]
    NotCommandable(String),

    #[error("config entry not loaded: {0}")]
    EntryNotLoaded(String),

    #[error("no camera available for entry {0}")]
    NoCamera(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Entries(#[from] ConfigEntryError),
}

/// Where an entity's data and commands belong
#[derive(Debug, Clone)]
struct EntityBinding {
    entry_id: String,
    platform: Platform,
    key: &'static str,
}

/// Everything alive for one loaded config entry
pub struct EntryRuntime {
    pub entry: ConfigEntry,
    pub client: Arc<PrinterClient>,
    pub coordinators: CoordinatorSet,
    pub device: DeviceInfo,
    pub camera: Option<CameraClient>,
    pub prefix: String,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// The central bridge instance
pub struct Bridge {
    pub bus: SharedEventBus,
    pub states: SharedStateStore,
    pub entries: Arc<ConfigEntryManager>,
    pub flow: ConfigFlow,
    pub services: Arc<ServiceRegistry>,
    runtimes: DashMap<String, Arc<EntryRuntime>>,
    bindings: DashMap<String, EntityBinding>,
}

impl Bridge {
    /// Create a bridge with its core services registered
    pub fn new(storage: Arc<Storage>) -> Arc<Self> {
        let bus: SharedEventBus = Arc::new(EventBus::new());
        let states: SharedStateStore = Arc::new(StateStore::new(bus.clone()));
        let entries = Arc::new(ConfigEntryManager::new(storage));
        let flow = ConfigFlow::new(entries.clone(), Arc::new(ApiConfigValidator));

        let bridge = Arc::new(Self {
            bus,
            states,
            entries,
            flow,
            services: Arc::new(ServiceRegistry::new()),
            runtimes: DashMap::new(),
            bindings: DashMap::new(),
        });
        bridge.register_core_services();
        bridge
    }

    /// Register the `number.set_value` and `button.press` services
    fn register_core_services(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.services
            .register("number", "set_value", move |call: ServiceCall| {
                let weak = weak.clone();
                async move {
                    let entity_id = required_entity_id(&call)?;
                    let value = call
                        .data
                        .get("value")
                        .and_then(Value::as_f64)
                        .ok_or_else(|| {
                            ServiceError::InvalidData("value is required".to_string())
                        })?;
                    dispatch_via(&weak, &entity_id, Some(value)).await
                }
            });

        let weak = Arc::downgrade(self);
        self.services
            .register("button", "press", move |call: ServiceCall| {
                let weak = weak.clone();
                async move {
                    let entity_id = required_entity_id(&call)?;
                    dispatch_via(&weak, &entity_id, None).await
                }
            });
    }

    /// Set up a config entry: connect, bind platforms, start polling
    pub async fn setup_entry(&self, entry: &ConfigEntry) -> Result<(), BridgeError> {
        let config = &entry.data;
        let client = Arc::new(PrinterClient::new(
            &config.host,
            config.conf_port,
            &config.conf_password,
        )?);
        client.login().await?;

        let system = client.get_system_info().await?;
        let info = SystemInfo::from_data(&system)
            .map_err(|err| ApiError::Protocol(format!("invalid system info: {err}")))?;
        let device = DeviceInfo::from_system_info(&info);

        let camera = match client.get_camera_info().await {
            Ok(data) => CameraInfo::from_data(&data)
                .ok()
                .and_then(|camera_info| self.build_camera(&config.host, &camera_info)),
            Err(err) => {
                warn!(entry_id = %entry.entry_id, error = %err, "Camera info unavailable");
                None
            }
        };

        let slug = slugify(device.name.as_deref().unwrap_or(&entry.title));
        let prefix = if slug.is_empty() {
            String::new()
        } else {
            format!("{slug}_")
        };

        let coordinators = CoordinatorSet::new(
            client.clone() as Arc<dyn DataFetcher>,
            Duration::from_secs(config.scan_interval.max(1)),
        );
        let tasks = bind_platforms(&coordinators, self.states.clone(), &prefix);

        for platform in Platform::ALL {
            for key in keys_for_platform(platform) {
                let entity_id = format!("{platform}.{prefix}{key}");
                self.bindings.insert(
                    entity_id,
                    EntityBinding {
                        entry_id: entry.entry_id.clone(),
                        platform,
                        key,
                    },
                );
            }
        }

        coordinators.refresh_all().await;
        coordinators.start_all().await;

        let runtime = Arc::new(EntryRuntime {
            entry: entry.clone(),
            client,
            coordinators,
            device,
            camera,
            prefix,
            tasks: Mutex::new(tasks),
        });
        self.runtimes.insert(entry.entry_id.clone(), runtime);

        info!(
            entry_id = %entry.entry_id,
            title = %entry.title,
            "Config entry set up"
        );
        Ok(())
    }

    fn build_camera(&self, host: &str, camera_info: &CameraInfo) -> Option<CameraClient> {
        let username = camera_info.user_name.clone()?;
        let password = camera_info.password.clone()?;
        let port = camera_info.camera_port().unwrap_or(DEFAULT_CAMERA_PORT);
        CameraClient::new(host, port, username, password).ok()
    }

    /// Set up every stored entry, logging failures without aborting
    pub async fn setup_all(&self) {
        for entry in self.entries.all() {
            if let Err(err) = self.setup_entry(&entry).await {
                error!(
                    entry_id = %entry.entry_id,
                    title = %entry.title,
                    error = %err,
                    "Config entry setup failed"
                );
            }
        }
    }

    /// Unload a running entry: stop polling, drop bindings and states
    pub async fn unload_entry(&self, entry_id: &str) -> Result<(), BridgeError> {
        let (_, runtime) = self
            .runtimes
            .remove(entry_id)
            .ok_or_else(|| BridgeError::EntryNotLoaded(entry_id.to_string()))?;

        runtime.coordinators.stop_all().await;
        for task in runtime.tasks.lock().await.drain(..) {
            task.abort();
        }

        let owned: Vec<String> = self
            .bindings
            .iter()
            .filter(|b| b.value().entry_id == entry_id)
            .map(|b| b.key().clone())
            .collect();
        for entity_id in owned {
            self.bindings.remove(&entity_id);
            if let Ok(parsed) = entity_id.parse::<EntityId>() {
                self.states.remove(&parsed);
            }
        }

        info!(entry_id, "Config entry unloaded");
        Ok(())
    }

    /// Remove an entry entirely: unload if running, then delete it
    pub async fn remove_entry(&self, entry_id: &str) -> Result<ConfigEntry, BridgeError> {
        if self.runtimes.contains_key(entry_id) {
            self.unload_entry(entry_id).await?;
        }
        Ok(self.entries.remove(entry_id).await?)
    }

    /// Unload everything, e.g. at shutdown
    pub async fn shutdown(&self) {
        let entry_ids: Vec<String> = self.runtimes.iter().map(|r| r.key().clone()).collect();
        for entry_id in entry_ids {
            if let Err(err) = self.unload_entry(&entry_id).await {
                warn!(entry_id = %entry_id, error = %err, "Unload failed during shutdown");
            }
        }
    }

    /// The runtime for a loaded entry
    pub fn runtime(&self, entry_id: &str) -> Option<Arc<EntryRuntime>> {
        self.runtimes.get(entry_id).map(|r| r.clone())
    }

    /// Forward a number/button command to the owning printer
    pub async fn handle_command(
        &self,
        entity_id: &str,
        value: Option<f64>,
    ) -> Result<(), BridgeError> {
        let binding = self
            .bindings
            .get(entity_id)
            .map(|b| b.value().clone())
            .ok_or_else(|| BridgeError::UnknownEntity(entity_id.to_string()))?;
        let runtime = self
            .runtime(&binding.entry_id)
            .ok_or_else(|| BridgeError::EntryNotLoaded(binding.entry_id.clone()))?;
        let command = find_command(binding.platform, binding.key)
            .ok_or_else(|| BridgeError::NotCommandable(entity_id.to_string()))?;

        command.dispatch(&runtime.client, value).await?;

        // Buttons expose the time of their last press as state
        if binding.platform == Platform::Button {
            if let Ok(parsed) = entity_id.parse::<EntityId>() {
                let attributes = self
                    .states
                    .get(entity_id)
                    .map(|s| s.attributes)
                    .unwrap_or_default();
                self.states
                    .set(parsed, chrono::Utc::now().to_rfc3339(), attributes);
            }
        }

        if let Some(target) = command.refresh_target() {
            if let Some(coordinator) = runtime.coordinators.get(target) {
                tokio::spawn(async move {
                    tokio::time::sleep(COMMAND_SETTLE).await;
                    coordinator.refresh().await;
                });
            }
        }
        Ok(())
    }

    /// Fetch a camera snapshot for an entry
    pub async fn snapshot(&self, entry_id: &str) -> Result<Vec<u8>, BridgeError> {
        let runtime = self
            .runtime(entry_id)
            .ok_or_else(|| BridgeError::EntryNotLoaded(entry_id.to_string()))?;
        let camera = runtime
            .camera
            .as_ref()
            .ok_or_else(|| BridgeError::NoCamera(entry_id.to_string()))?;
        Ok(camera.snapshot().await?)
    }
}

fn required_entity_id(call: &ServiceCall) -> Result<String, ServiceError> {
    call.entity_id()
        .map(str::to_string)
        .ok_or_else(|| ServiceError::InvalidData("entity_id is required".to_string()))
}

async fn dispatch_via(
    weak: &std::sync::Weak<Bridge>,
    entity_id: &str,
    value: Option<f64>,
) -> ServiceResult {
    let bridge = weak
        .upgrade()
        .ok_or_else(|| ServiceError::CallFailed("bridge is shutting down".to_string()))?;
    bridge
        .handle_command(entity_id, value)
        .await
        .map_err(|err| match err {
            BridgeError::UnknownEntity(_) | BridgeError::NotCommandable(_) => {
                ServiceError::InvalidData(err.to_string())
            }
            other => ServiceError::CallFailed(other.to_string()),
        })?;
    Ok(None)
}
