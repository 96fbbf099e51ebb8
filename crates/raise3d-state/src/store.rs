//! Entity state storage with platform indexing

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use raise3d_core::{EntityId, Platform, State, STATE_UNAVAILABLE};

use crate::bus::{EventBus, EventData};

/// Event type fired whenever an entity's state is written or removed
pub const STATE_CHANGED: &str = "state_changed";

/// Data for state-changed events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChangedData {
    pub entity_id: EntityId,
    pub old_state: Option<State>,
    pub new_state: Option<State>,
}

impl EventData for StateChangedData {
    fn event_type() -> &'static str {
        STATE_CHANGED
    }
}

/// The state store tracks all entity states
///
/// Responsible for storing the current state of every entity, indexing by
/// platform, and firing state-changed events on the bus.
pub struct StateStore {
    /// All entity states keyed by entity_id string
    states: DashMap<String, State>,
    /// Index of entity_ids by platform
    platform_index: DashMap<Platform, Vec<String>>,
    /// Event bus for firing state change events
    event_bus: Arc<EventBus>,
}

impl StateStore {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            states: DashMap::new(),
            platform_index: DashMap::new(),
            event_bus,
        }
    }

    /// Set the state of an entity
    ///
    /// `last_changed` is only bumped when the value actually changed.
    /// Fires a state-changed event with the old and new state.
    #[instrument(skip(self, state, attributes), fields(entity_id = %entity_id))]
    pub fn set(
        &self,
        entity_id: EntityId,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
    ) -> State {
        let entity_id_str = entity_id.to_string();
        let platform = entity_id.platform();

        let old_state = self.states.get(&entity_id_str).map(|s| s.clone());

        let new_state = match &old_state {
            Some(existing) => existing.with_update(state, attributes),
            None => State::new(entity_id.clone(), state, attributes),
        };

        debug!(
            state = %new_state.state,
            changed = old_state.as_ref().map(|s| s.state != new_state.state).unwrap_or(true),
            "Setting entity state"
        );

        self.states.insert(entity_id_str.clone(), new_state.clone());

        if old_state.is_none() {
            self.platform_index
                .entry(platform)
                .or_default()
                .push(entity_id_str);
        }

        self.event_bus.fire_typed(StateChangedData {
            entity_id,
            old_state,
            new_state: Some(new_state.clone()),
        });

        new_state
    }

    /// Mark an entity unavailable, keeping its last attributes
    pub fn set_unavailable(&self, entity_id: EntityId) -> State {
        let attributes = self
            .states
            .get(&entity_id.to_string())
            .map(|s| s.attributes.clone())
            .unwrap_or_default();
        self.set(entity_id, STATE_UNAVAILABLE, attributes)
    }

    /// Get the current state of an entity
    pub fn get(&self, entity_id: &str) -> Option<State> {
        self.states.get(entity_id).map(|s| s.clone())
    }

    /// Get the state value as a string, or None if entity doesn't exist
    pub fn get_state(&self, entity_id: &str) -> Option<String> {
        self.states.get(entity_id).map(|s| s.state.clone())
    }

    /// Check if an entity is in a specific state
    pub fn is_state(&self, entity_id: &str, state: &str) -> bool {
        self.get_state(entity_id).as_deref() == Some(state)
    }

    /// Get all entity IDs for a platform
    pub fn entity_ids(&self, platform: Platform) -> Vec<String> {
        self.platform_index
            .get(&platform)
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    /// Get all states for a platform
    pub fn platform_states(&self, platform: Platform) -> Vec<State> {
        self.entity_ids(platform)
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Get all states
    pub fn all(&self) -> Vec<State> {
        self.states.iter().map(|r| r.value().clone()).collect()
    }

    /// Remove an entity's state
    ///
    /// Fires a state-changed event with None for the new state.
    #[instrument(skip(self), fields(entity_id = %entity_id))]
    pub fn remove(&self, entity_id: &EntityId) -> Option<State> {
        let entity_id_str = entity_id.to_string();
        let platform = entity_id.platform();

        let old_state = self.states.remove(&entity_id_str).map(|(_, s)| s);

        if let Some(ref state) = old_state {
            trace!("Removing entity state");

            if let Some(mut ids) = self.platform_index.get_mut(&platform) {
                ids.retain(|id| id != &entity_id_str);
            }

            self.event_bus.fire_typed(StateChangedData {
                entity_id: entity_id.clone(),
                old_state: Some(state.clone()),
                new_state: None,
            });
        }

        old_state
    }

    /// Total number of entities
    pub fn entity_count(&self) -> usize {
        self.states.len()
    }
}

/// Thread-safe wrapper for StateStore
pub type SharedStateStore = Arc<StateStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (Arc<EventBus>, StateStore) {
        let bus = Arc::new(EventBus::new());
        let store = StateStore::new(bus.clone());
        (bus, store)
    }

    fn sensor(object_id: &str) -> EntityId {
        EntityId::new(Platform::Sensor, object_id).unwrap()
    }

    #[tokio::test]
    async fn test_set_fires_state_changed() {
        let (bus, store) = store();
        let mut rx = bus.subscribe_typed::<StateChangedData>();

        store.set(sensor("print_progress"), "42", HashMap::new());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity_id.to_string(), "sensor.print_progress");
        assert!(event.old_state.is_none());
        assert_eq!(event.new_state.unwrap().state, "42");
    }

    #[tokio::test]
    async fn test_platform_index() {
        let (_bus, store) = store();
        store.set(sensor("print_progress"), "42", HashMap::new());
        store.set(sensor("total_layer"), "120", HashMap::new());
        store.set(
            EntityId::new(Platform::Button, "move_home").unwrap(),
            "unknown",
            HashMap::new(),
        );

        assert_eq!(store.entity_ids(Platform::Sensor).len(), 2);
        assert_eq!(store.entity_ids(Platform::Button).len(), 1);
        assert_eq!(store.entity_ids(Platform::Camera).len(), 0);
        assert_eq!(store.entity_count(), 3);
    }

    #[tokio::test]
    async fn test_set_unavailable_keeps_attributes() {
        let (_bus, store) = store();
        let mut attributes = HashMap::new();
        attributes.insert("unit_of_measurement".to_string(), json!("%"));
        store.set(sensor("print_progress"), "42", attributes);

        let state = store.set_unavailable(sensor("print_progress"));
        assert!(state.is_unavailable());
        assert_eq!(state.attributes["unit_of_measurement"], json!("%"));
    }

    #[tokio::test]
    async fn test_remove_fires_event_with_none_new_state() {
        let (bus, store) = store();
        store.set(sensor("job_id"), "j-1", HashMap::new());
        let mut rx = bus.subscribe_typed::<StateChangedData>();

        let removed = store.remove(&sensor("job_id")).unwrap();
        assert_eq!(removed.state, "j-1");

        let event = rx.recv().await.unwrap();
        assert!(event.new_state.is_none());
        assert_eq!(store.entity_count(), 0);
        assert!(store.entity_ids(Platform::Sensor).is_empty());
    }

    #[tokio::test]
    async fn test_is_state() {
        let (_bus, store) = store();
        store.set(sensor("running_status"), "running", HashMap::new());
        assert!(store.is_state("sensor.running_status", "running"));
        assert!(!store.is_state("sensor.running_status", "idle"));
        assert!(!store.is_state("sensor.missing", "idle"));
    }
}
