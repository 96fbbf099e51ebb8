//! Polling coordinators for the Raise3D bridge
//!
//! One coordinator per printer endpoint fetches on a shared interval and
//! fans the payload out over a watch channel. The platform binder projects
//! those payloads through the entity catalog into the state store.

mod binder;
mod coordinator;
mod fetcher;

pub use binder::{apply_update, bind_platforms, register_buttons};
pub use coordinator::{CoordinatorSet, UpdateCoordinator};
pub use fetcher::DataFetcher;
