//! Platform binder
//!
//! Projects coordinator payloads through the entity catalog into the
//! state store. Sensors, binary sensors, numbers and the camera follow
//! their coordinator; buttons are stateless and registered once.
//!
//! Object ids are prefixed with the device slug (e.g.
//! `sensor.garage_pro2_print_progress`) so several printers can share one
//! store.

use std::collections::HashMap;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use raise3d_core::{ApiData, EntityId, Platform, STATE_UNKNOWN};
use raise3d_entities::{
    attributes_for, state_string, PollTarget, ValueConverter, BINARY_SENSORS, BUTTONS, CAMERAS,
    NUMBERS, SENSORS,
};
use raise3d_state::{SharedStateStore, StateStore};

use crate::coordinator::CoordinatorSet;

/// Poll targets referenced by at least one catalog entry
fn bound_targets() -> Vec<PollTarget> {
    let mut targets: Vec<PollTarget> = Vec::new();
    let mut push = |target: PollTarget| {
        if !targets.contains(&target) {
            targets.push(target);
        }
    };
    for desc in SENSORS {
        push(desc.target);
    }
    for desc in BINARY_SENSORS {
        push(desc.target);
    }
    for desc in CAMERAS {
        push(desc.target);
    }
    for desc in NUMBERS {
        push(desc.target);
    }
    targets
}

fn prefixed_entity(platform: Platform, prefix: &str, key: &str) -> Option<EntityId> {
    EntityId::new(platform, format!("{prefix}{key}")).ok()
}

fn entity_attributes(platform: Platform, key: &str) -> HashMap<String, Value> {
    let mut attributes = attributes_for(platform, key);
    attributes.insert(
        "friendly_name".to_string(),
        Value::String(raise3d_strings::entity_label(platform, key)),
    );
    attributes
}

fn set_from_attribute(
    store: &StateStore,
    entity_id: EntityId,
    data: Option<&ApiData>,
    attribute: &str,
    converter: ValueConverter,
    attributes: HashMap<String, Value>,
) {
    let Some(data) = data else {
        store.set_unavailable(entity_id);
        return;
    };
    let Some(raw) = data.get(attribute) else {
        store.set_unavailable(entity_id);
        return;
    };

    let converted = converter.apply(raw);
    let state = state_string(converted.as_ref());
    store.set(entity_id, state, attributes);
}

/// Write one endpoint's payload into the state store
pub fn apply_update(target: PollTarget, data: Option<&ApiData>, store: &StateStore, prefix: &str) {
    debug!(%target, available = data.is_some(), "Applying coordinator update");

    for desc in SENSORS.iter().filter(|d| d.target == target) {
        let Some(entity_id) = prefixed_entity(Platform::Sensor, prefix, desc.key) else {
            continue;
        };
        let attributes = entity_attributes(Platform::Sensor, desc.key);
        set_from_attribute(
            store,
            entity_id,
            data,
            desc.attribute,
            desc.converter,
            attributes,
        );
    }

    for desc in BINARY_SENSORS.iter().filter(|d| d.target == target) {
        let Some(entity_id) = prefixed_entity(Platform::BinarySensor, prefix, desc.key) else {
            continue;
        };
        let mut attributes = entity_attributes(Platform::BinarySensor, desc.key);

        let converted = match data.and_then(|d| d.get(desc.attribute)) {
            Some(raw) => desc.converter.apply(raw),
            None => None,
        };
        match (data, converted) {
            (Some(_), Some(value)) => {
                let is_on = value == Value::Bool(true);
                let icon = if is_on { desc.icon } else { desc.icon_off };
                if let Some(icon) = icon {
                    attributes.insert("icon".to_string(), Value::String(icon.to_string()));
                }
                store.set(entity_id, state_string(Some(&value)), attributes);
            }
            _ => {
                store.set_unavailable(entity_id);
            }
        }
    }

    for desc in CAMERAS.iter().filter(|d| d.target == target) {
        let Some(entity_id) = prefixed_entity(Platform::Camera, prefix, desc.key) else {
            continue;
        };
        let attributes = entity_attributes(Platform::Camera, desc.key);

        let connected = data
            .and_then(|d| d.get(desc.connected_attribute))
            .and_then(|raw| ValueConverter::BoolLike.apply(raw))
            == Some(Value::Bool(true));
        if connected {
            store.set(entity_id, "idle", attributes);
        } else {
            store.set_unavailable(entity_id);
        }
    }

    for desc in NUMBERS.iter().filter(|d| d.target == target) {
        let Some(entity_id) = prefixed_entity(Platform::Number, prefix, desc.key) else {
            continue;
        };
        let attributes = entity_attributes(Platform::Number, desc.key);
        set_from_attribute(
            store,
            entity_id,
            data,
            desc.attribute,
            desc.converter,
            attributes,
        );
    }
}

/// Register the stateless button entities
pub fn register_buttons(store: &StateStore, prefix: &str) {
    for desc in BUTTONS {
        let Some(entity_id) = prefixed_entity(Platform::Button, prefix, desc.key) else {
            continue;
        };
        let attributes = entity_attributes(Platform::Button, desc.key);
        store.set(entity_id, STATE_UNKNOWN, attributes);
    }
}

/// Bind every platform to its coordinator
///
/// Creates the coordinators for all bound targets, registers every entity
/// (unavailable until the first successful refresh), and spawns one task
/// per target that mirrors payload updates into the store.
pub fn bind_platforms(
    set: &CoordinatorSet,
    store: SharedStateStore,
    prefix: &str,
) -> Vec<JoinHandle<()>> {
    register_buttons(&store, prefix);

    let mut tasks = Vec::new();
    for target in bound_targets() {
        let coordinator = set.get_or_create(target);
        let mut rx = coordinator.subscribe();
        let store = store.clone();
        let prefix = prefix.to_string();

        apply_update(target, coordinator.data().as_ref(), &store, &prefix);

        tasks.push(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let data = rx.borrow().clone();
                apply_update(target, data.as_ref(), &store, &prefix);
            }
        }));
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use raise3d_api::ApiResult;
    use raise3d_state::EventBus;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn store() -> SharedStateStore {
        Arc::new(StateStore::new(Arc::new(EventBus::new())))
    }

    fn data(value: serde_json::Value) -> ApiData {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_sensor_update_with_conversion() {
        let store = store();
        let payload = data(json!({
            "fan_cur_speed": 100,
            "feed_cur_rate": 100,
            "feed_tar_rate": 100,
            "heatbed_cur_temp": 62.5,
            "heatbed_tar_temp": 65
        }));

        apply_update(PollTarget::BasicInfo, Some(&payload), &store, "");

        let state = store.get("sensor.heatbed_cur_temp").unwrap();
        assert_eq!(state.state, "62.5");
        assert_eq!(state.attributes["unit_of_measurement"], json!("°C"));
        assert_eq!(
            state.attributes["friendly_name"],
            json!("Heatbed Current Temperature")
        );

        // Numbers bound to the same endpoint update too
        let state = store.get("number.heatbed_tar_temp").unwrap();
        assert_eq!(state.state, "65.0");
    }

    #[tokio::test]
    async fn test_prefix_scopes_entity_ids() {
        let store = store();
        let payload = data(json!({"print_progress": 42}));

        apply_update(PollTarget::CurrentJob, Some(&payload), &store, "garage_pro2_");

        let state = store.get("sensor.garage_pro2_print_progress").unwrap();
        assert_eq!(state.state, "42");
        // Friendly name stays unprefixed
        assert_eq!(state.attributes["friendly_name"], json!("Print Progress"));
        assert!(store.get("sensor.print_progress").is_none());
    }

    #[tokio::test]
    async fn test_missing_attribute_marks_unavailable() {
        let store = store();
        let payload = data(json!({"fan_cur_speed": 100}));

        apply_update(PollTarget::BasicInfo, Some(&payload), &store, "");

        assert!(store
            .get("sensor.heatbed_cur_temp")
            .unwrap()
            .is_unavailable());
        assert_eq!(store.get("sensor.fan_cur_speed").unwrap().state, "100");
    }

    #[tokio::test]
    async fn test_none_payload_marks_all_target_entities_unavailable() {
        let store = store();
        apply_update(
            PollTarget::CurrentJob,
            Some(&data(json!({"print_progress": 42}))),
            &store,
            "",
        );
        assert_eq!(store.get("sensor.print_progress").unwrap().state, "42");

        apply_update(PollTarget::CurrentJob, None, &store, "");
        assert!(store.get("sensor.print_progress").unwrap().is_unavailable());
    }

    #[tokio::test]
    async fn test_binary_sensor_icon_tracks_state() {
        let store = store();

        apply_update(
            PollTarget::CameraInfo,
            Some(&data(json!({"is_camera_connected": "true"}))),
            &store,
            "",
        );
        let state = store.get("binary_sensor.is_camera_connected").unwrap();
        assert_eq!(state.state, "on");
        assert_eq!(state.attributes["icon"], json!("mdi:webcam"));

        apply_update(
            PollTarget::CameraInfo,
            Some(&data(json!({"is_camera_connected": false}))),
            &store,
            "",
        );
        let state = store.get("binary_sensor.is_camera_connected").unwrap();
        assert_eq!(state.state, "off");
        assert_eq!(state.attributes["icon"], json!("mdi:webcam-off"));
    }

    #[tokio::test]
    async fn test_camera_availability_follows_connection() {
        let store = store();

        apply_update(
            PollTarget::CameraInfo,
            Some(&data(json!({"is_camera_connected": true}))),
            &store,
            "",
        );
        assert_eq!(store.get("camera.camera").unwrap().state, "idle");

        apply_update(
            PollTarget::CameraInfo,
            Some(&data(json!({"is_camera_connected": "false"}))),
            &store,
            "",
        );
        assert!(store.get("camera.camera").unwrap().is_unavailable());
    }

    #[tokio::test]
    async fn test_blank_value_is_unknown_but_available() {
        let store = store();
        apply_update(
            PollTarget::SystemInfo,
            Some(&data(json!({"machine_name": "  "}))),
            &store,
            "",
        );
        let state = store.get("sensor.machine_name").unwrap();
        assert!(state.is_unknown());
        assert!(!state.is_unavailable());
    }

    #[tokio::test]
    async fn test_register_buttons() {
        let store = store();
        register_buttons(&store, "");

        assert_eq!(store.entity_ids(Platform::Button).len(), BUTTONS.len());
        let state = store.get("button.job_action_pause").unwrap();
        assert!(state.is_unknown());
        assert_eq!(state.attributes["friendly_name"], json!("Pause Current Job"));
    }

    struct StaticFetcher(serde_json::Value);

    #[async_trait]
    impl crate::DataFetcher for StaticFetcher {
        async fn fetch(&self, target: PollTarget) -> ApiResult<ApiData> {
            let _ = target;
            Ok(self.0.as_object().cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_bind_platforms_registers_everything_and_follows_refreshes() {
        let store = store();
        let set = CoordinatorSet::new(
            Arc::new(StaticFetcher(json!({
                "machine_id": "m-1",
                "is_camera_connected": true,
                "print_progress": 10
            }))),
            Duration::from_secs(30),
        );

        let tasks = bind_platforms(&set, store.clone(), "");
        // All bound targets got a coordinator; buttons registered immediately
        assert_eq!(set.len(), PollTarget::ALL.len());
        assert_eq!(store.entity_ids(Platform::Button).len(), BUTTONS.len());
        assert!(store.get("sensor.machine_id").unwrap().is_unavailable());

        set.refresh_all().await;
        // Give the binder tasks a moment to observe the watch updates
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("sensor.machine_id").unwrap().state, "m-1");
        assert_eq!(store.get("sensor.print_progress").unwrap().state, "10");
        assert_eq!(store.get("camera.camera").unwrap().state, "idle");

        for task in tasks {
            task.abort();
        }
    }
}
