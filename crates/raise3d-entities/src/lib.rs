//! Entity catalog for the Raise3D bridge
//!
//! Every entity the bridge exposes is described by a static table entry
//! binding it to a polled endpoint, a payload attribute, a value converter
//! and its presentation metadata. Numbers and buttons additionally carry
//! the command that forwards user input to the printer.

mod binary_sensor;
mod button;
mod camera;
mod catalog;
mod command;
mod convert;
mod description;
mod device;
mod number;
mod sensor;

pub use binary_sensor::BINARY_SENSORS;
pub use button::BUTTONS;
pub use camera::CAMERAS;
pub use catalog::{attributes_for, find_command, keys_for_platform, state_string};
pub use command::{Axis, Command, CommandError, Nozzle};
pub use convert::ValueConverter;
pub use description::{
    BinarySensorDescription, ButtonDescription, CameraDescription, EntityCategory,
    NumberDescription, NumberMode, PollTarget, SensorDescription, StateClass,
};
pub use device::DeviceInfo;
pub use number::NUMBERS;
pub use sensor::SENSORS;
