//! Config flow
//!
//! The flow shows the user form, validates the settings by actually
//! connecting to the printer, and either creates an entry, re-shows the
//! form with a field error, or aborts when the printer is already
//! configured.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use raise3d_api::{ApiError, PrinterClient};
use raise3d_core::{SystemInfo, DEFAULT_PRINTER_PORT, DEFAULT_SCAN_INTERVAL};

use crate::entry::ConfigEntry;
use crate::manager::{ConfigEntryError, ConfigEntryManager};
use crate::printer_config::PrinterConfig;

/// Error reason shown on the password field when the printer rejects it
pub const ERROR_INVALID_PASSWORD: &str = "invalid_password";
/// Error reason shown on the host field for any other connection failure
pub const ERROR_CONNECTION: &str = "connection_error";
/// Abort reason when the printer is already configured
pub const ABORT_ALREADY_CONFIGURED: &str = "already_configured";

/// Flow-level errors (distinct from validation errors shown in the form)
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("unknown flow: {0}")]
    UnknownFlow(String),

    #[error("invalid user input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Entries(#[from] ConfigEntryError),
}

/// Form field schema
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FormField {
    fn new(name: &str, field_type: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            required,
            default: None,
            label: raise3d_strings::config_field_label(name).map(str::to_string),
        }
    }

    fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Result of a config flow step
#[derive(Debug, Clone, Serialize)]
pub struct FlowResult {
    pub flow_id: String,
    /// Result type: form, create_entry, abort
    #[serde(rename = "type")]
    pub result_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    /// Always present, empty when not a form
    pub data_schema: Vec<FormField>,
    /// Field errors from the previous submission (None when none)
    pub errors: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

impl FlowResult {
    fn form(flow_id: String, errors: Option<HashMap<String, String>>) -> Self {
        Self {
            flow_id,
            result_type: "form".to_string(),
            step_id: Some("user".to_string()),
            data_schema: user_form_schema(),
            errors,
            title: None,
            reason: None,
            entry_id: None,
        }
    }

    fn abort(flow_id: String, reason: &str) -> Self {
        Self {
            flow_id,
            result_type: "abort".to_string(),
            step_id: None,
            data_schema: Vec::new(),
            errors: None,
            title: None,
            reason: Some(reason.to_string()),
            entry_id: None,
        }
    }

    fn create_entry(flow_id: String, entry: &ConfigEntry) -> Self {
        Self {
            flow_id,
            result_type: "create_entry".to_string(),
            step_id: None,
            data_schema: Vec::new(),
            errors: None,
            title: Some(entry.title.clone()),
            reason: None,
            entry_id: Some(entry.entry_id.clone()),
        }
    }
}

/// The user step form: host, port, password, polling interval
fn user_form_schema() -> Vec<FormField> {
    vec![
        FormField::new("host", "string", true),
        FormField::new("conf_port", "integer", true)
            .with_default(json!(DEFAULT_PRINTER_PORT)),
        FormField::new("conf_password", "password", true),
        FormField::new("scan_interval", "integer", false)
            .with_default(json!(DEFAULT_SCAN_INTERVAL)),
    ]
}

/// Validates printer settings by connecting
///
/// The real implementation logs in and fetches system info; tests
/// substitute a scripted validator.
#[async_trait]
pub trait ConfigValidator: Send + Sync {
    async fn validate(&self, config: &PrinterConfig) -> Result<SystemInfo, ApiError>;
}

/// Validator backed by the printer API
#[derive(Debug, Default)]
pub struct ApiConfigValidator;

#[async_trait]
impl ConfigValidator for ApiConfigValidator {
    async fn validate(&self, config: &PrinterConfig) -> Result<SystemInfo, ApiError> {
        let client = PrinterClient::new(&config.host, config.conf_port, &config.conf_password)?;
        client.login().await?;
        let data = client.get_system_info().await?;
        SystemInfo::from_data(&data)
            .map_err(|err| ApiError::Protocol(format!("invalid system info: {err}")))
    }
}

/// Guided setup flow for adding a printer
pub struct ConfigFlow {
    manager: Arc<ConfigEntryManager>,
    validator: Arc<dyn ConfigValidator>,
    active: DashMap<String, ()>,
}

impl ConfigFlow {
    pub fn new(manager: Arc<ConfigEntryManager>, validator: Arc<dyn ConfigValidator>) -> Self {
        Self {
            manager,
            validator,
            active: DashMap::new(),
        }
    }

    /// Start a new flow, returning the user form
    pub fn start(&self) -> FlowResult {
        let flow_id = ulid::Ulid::new().to_string();
        self.active.insert(flow_id.clone(), ());
        debug!(%flow_id, "Started config flow");
        FlowResult::form(flow_id, None)
    }

    /// Continue a flow with user input
    pub async fn progress(
        &self,
        flow_id: &str,
        user_input: serde_json::Value,
    ) -> Result<FlowResult, FlowError> {
        if !self.active.contains_key(flow_id) {
            return Err(FlowError::UnknownFlow(flow_id.to_string()));
        }

        let config: PrinterConfig = serde_json::from_value(user_input)
            .map_err(|err| FlowError::InvalidInput(err.to_string()))?;
        if let Err(err) = config.validate() {
            return Err(FlowError::InvalidInput(err.to_string()));
        }

        let system_info = match self.validator.validate(&config).await {
            Ok(info) => info,
            Err(err) => {
                let (field, reason) = if err.status_code() == Some(403) {
                    ("conf_password", ERROR_INVALID_PASSWORD)
                } else {
                    ("host", ERROR_CONNECTION)
                };
                debug!(flow_id, %err, reason, "Config flow validation failed");
                let errors = HashMap::from([(field.to_string(), reason.to_string())]);
                return Ok(FlowResult::form(flow_id.to_string(), Some(errors)));
            }
        };

        if self
            .manager
            .get_by_unique_id(&system_info.machine_id)
            .is_some()
        {
            self.active.remove(flow_id);
            info!(
                flow_id,
                machine_id = %system_info.machine_id,
                "Aborting flow: printer already configured"
            );
            return Ok(FlowResult::abort(
                flow_id.to_string(),
                ABORT_ALREADY_CONFIGURED,
            ));
        }

        let title = system_info
            .machine_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| config.host.clone());
        let entry = self
            .manager
            .add(ConfigEntry::new(title, config, &system_info.machine_id))
            .await?;

        self.active.remove(flow_id);
        info!(flow_id, entry_id = %entry.entry_id, "Config flow created entry");
        Ok(FlowResult::create_entry(flow_id.to_string(), &entry))
    }

    /// Abort an in-progress flow
    pub fn cancel(&self, flow_id: &str) -> bool {
        self.active.remove(flow_id).is_some()
    }

    /// Number of flows awaiting input
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
