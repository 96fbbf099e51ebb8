//! Raise3D bridge daemon
//!
//! Wires the pieces together: config entries become per-printer runtimes
//! (API client, coordinators, platform bindings), user commands arrive as
//! service calls, and everything is exposed over a small REST API.

pub mod api;
pub mod bridge;
pub mod services;
pub mod settings;

pub use bridge::{Bridge, BridgeError, EntryRuntime};
pub use services::{ServiceCall, ServiceError, ServiceRegistry, ServiceResult};
pub use settings::BridgeSettings;
