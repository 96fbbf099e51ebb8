//! Event bus and entity state store
//!
//! The bus is the bridge's internal broker: the coordinators publish
//! entity state changes through the store, which fires events that the
//! REST layer and tests can subscribe to.

mod bus;
mod store;

pub use bus::{Event, EventBus, EventData, SharedEventBus, TypedEventReceiver};
pub use store::{SharedStateStore, StateChangedData, StateStore, STATE_CHANGED};
