//! REST API
//!
//! A small HTTP surface over the bridge: entity states, service calls,
//! the config flow, entry management, translations, and camera snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::warn;

use raise3d_config::{FlowError, FlowResult};
use raise3d_core::State as EntityState;

use crate::bridge::{Bridge, BridgeError};
use crate::services::{ServiceCall, ServiceError};

/// Build the REST router
pub fn router(bridge: Arc<Bridge>) -> Router {
    Router::new()
        .route("/api/states", get(list_states))
        .route("/api/states/:entity_id", get(get_state))
        .route("/api/services/:domain/:service", post(call_service))
        .route("/api/config/entries", get(list_entries))
        .route("/api/config/entries/:entry_id", delete(remove_entry))
        .route("/api/config/flow", post(start_flow))
        .route("/api/config/flow/:flow_id", post(progress_flow))
        .route("/api/camera_proxy/:entry_id", get(camera_proxy))
        .route("/api/translations", get(translations))
        .layer(TraceLayer::new_for_http())
        .with_state(bridge)
}

/// An error response with a JSON message body
struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<ServiceError> for ApiFailure {
    fn from(err: ServiceError) -> Self {
        let status = match err {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::InvalidData(_) => StatusCode::BAD_REQUEST,
            ServiceError::CallFailed(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<FlowError> for ApiFailure {
    fn from(err: FlowError) -> Self {
        let status = match err {
            FlowError::UnknownFlow(_) => StatusCode::NOT_FOUND,
            FlowError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FlowError::Entries(_) => StatusCode::CONFLICT,
        };
        Self::new(status, err.to_string())
    }
}

impl From<BridgeError> for ApiFailure {
    fn from(err: BridgeError) -> Self {
        let status = match err {
            BridgeError::UnknownEntity(_)
            | BridgeError::EntryNotLoaded(_)
            | BridgeError::NoCamera(_) => StatusCode::NOT_FOUND,
            BridgeError::NotCommandable(_) => StatusCode::BAD_REQUEST,
            BridgeError::Entries(_) => StatusCode::CONFLICT,
            BridgeError::Api(_) | BridgeError::Command(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

async fn list_states(State(bridge): State<Arc<Bridge>>) -> Json<Vec<EntityState>> {
    let mut states = bridge.states.all();
    states.sort_by(|a, b| a.entity_id.to_string().cmp(&b.entity_id.to_string()));
    Json(states)
}

async fn get_state(
    State(bridge): State<Arc<Bridge>>,
    Path(entity_id): Path<String>,
) -> Result<Json<EntityState>, ApiFailure> {
    bridge
        .states
        .get(&entity_id)
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found(format!("unknown entity: {entity_id}")))
}

async fn call_service(
    State(bridge): State<Arc<Bridge>>,
    Path((domain, service)): Path<(String, String)>,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiFailure> {
    let result = bridge
        .services
        .call(ServiceCall::new(domain, service, data))
        .await?;
    Ok(Json(json!({ "result": result })))
}

async fn list_entries(State(bridge): State<Arc<Bridge>>) -> Json<Value> {
    let entries: Vec<Value> = bridge
        .entries
        .all()
        .into_iter()
        .map(|entry| {
            let loaded = bridge.runtime(&entry.entry_id).is_some();
            let device = bridge
                .runtime(&entry.entry_id)
                .map(|runtime| serde_json::to_value(&runtime.device).unwrap_or(Value::Null));
            json!({
                "entry_id": entry.entry_id,
                "title": entry.title,
                "unique_id": entry.unique_id,
                "host": entry.data.host,
                "scan_interval": entry.data.scan_interval,
                "loaded": loaded,
                "device": device,
            })
        })
        .collect();
    Json(Value::Array(entries))
}

async fn remove_entry(
    State(bridge): State<Arc<Bridge>>,
    Path(entry_id): Path<String>,
) -> Result<Json<Value>, ApiFailure> {
    let entry = bridge.remove_entry(&entry_id).await?;
    Ok(Json(json!({ "removed": entry.entry_id })))
}

async fn start_flow(State(bridge): State<Arc<Bridge>>) -> Json<FlowResult> {
    Json(bridge.flow.start())
}

async fn progress_flow(
    State(bridge): State<Arc<Bridge>>,
    Path(flow_id): Path<String>,
    Json(user_input): Json<Value>,
) -> Result<Json<FlowResult>, ApiFailure> {
    let result = bridge.flow.progress(&flow_id, user_input).await?;

    if result.result_type == "create_entry" {
        if let Some(entry_id) = &result.entry_id {
            if let Some(entry) = bridge.entries.get(entry_id) {
                if let Err(err) = bridge.setup_entry(&entry).await {
                    warn!(entry_id = %entry_id, error = %err, "Setup after config flow failed");
                }
            }
        }
    }

    Ok(Json(result))
}

async fn camera_proxy(
    State(bridge): State<Arc<Bridge>>,
    Path(entry_id): Path<String>,
) -> Result<Response, ApiFailure> {
    let image = bridge.snapshot(&entry_id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], image).into_response())
}

async fn translations() -> Json<Value> {
    let resources: HashMap<String, String> = raise3d_strings::resources();
    Json(json!({ "resources": resources }))
}
