//! Entity description types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::command::Command;
use crate::convert::ValueConverter;

/// The polled printer endpoints entities draw their data from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollTarget {
    SystemInfo,
    CameraInfo,
    RunningStatus,
    BasicInfo,
    LeftNozzle,
    RightNozzle,
    CurrentJob,
    Statistics,
}

impl PollTarget {
    pub const ALL: [PollTarget; 8] = [
        PollTarget::SystemInfo,
        PollTarget::CameraInfo,
        PollTarget::RunningStatus,
        PollTarget::BasicInfo,
        PollTarget::LeftNozzle,
        PollTarget::RightNozzle,
        PollTarget::CurrentJob,
        PollTarget::Statistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PollTarget::SystemInfo => "system_info",
            PollTarget::CameraInfo => "camera_info",
            PollTarget::RunningStatus => "running_status",
            PollTarget::BasicInfo => "basic_info",
            PollTarget::LeftNozzle => "left_nozzle",
            PollTarget::RightNozzle => "right_nozzle",
            PollTarget::CurrentJob => "current_job",
            PollTarget::Statistics => "statistics",
        }
    }
}

impl fmt::Display for PollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity category, mirrored into state attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Config => "config",
            EntityCategory::Diagnostic => "diagnostic",
        }
    }
}

/// Statistics semantics of a numeric sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    Total,
    TotalIncreasing,
}

impl StateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateClass::Measurement => "measurement",
            StateClass::Total => "total",
            StateClass::TotalIncreasing => "total_increasing",
        }
    }
}

/// Input widget style for numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberMode {
    Auto,
    Box,
    Slider,
}

impl NumberMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberMode::Auto => "auto",
            NumberMode::Box => "box",
            NumberMode::Slider => "slider",
        }
    }
}

/// Describes one sensor entity
#[derive(Debug, Clone, Copy)]
pub struct SensorDescription {
    /// Stable entity key, unique within the platform
    pub key: &'static str,
    /// Endpoint the value comes from
    pub target: PollTarget,
    /// Attribute extracted from the endpoint payload
    pub attribute: &'static str,
    pub converter: ValueConverter,
    pub icon: Option<&'static str>,
    pub device_class: Option<&'static str>,
    pub state_class: Option<StateClass>,
    pub unit: Option<&'static str>,
    pub entity_category: Option<EntityCategory>,
    /// Allowed values for enum sensors
    pub options: Option<&'static [&'static str]>,
}

impl SensorDescription {
    pub const fn new(key: &'static str, target: PollTarget, attribute: &'static str) -> Self {
        Self {
            key,
            target,
            attribute,
            converter: ValueConverter::Trimmed,
            icon: None,
            device_class: None,
            state_class: None,
            unit: None,
            entity_category: None,
            options: None,
        }
    }

    pub const fn converter(mut self, converter: ValueConverter) -> Self {
        self.converter = converter;
        self
    }

    pub const fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub const fn device_class(mut self, device_class: &'static str) -> Self {
        self.device_class = Some(device_class);
        self
    }

    pub const fn state_class(mut self, state_class: StateClass) -> Self {
        self.state_class = Some(state_class);
        self
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn diagnostic(mut self) -> Self {
        self.entity_category = Some(EntityCategory::Diagnostic);
        self
    }

    pub const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = Some(options);
        self
    }
}

/// Describes one binary sensor entity
#[derive(Debug, Clone, Copy)]
pub struct BinarySensorDescription {
    pub key: &'static str,
    pub target: PollTarget,
    pub attribute: &'static str,
    pub converter: ValueConverter,
    /// Icon when on
    pub icon: Option<&'static str>,
    /// Icon when off or unavailable
    pub icon_off: Option<&'static str>,
    pub device_class: Option<&'static str>,
    pub entity_category: Option<EntityCategory>,
}

/// Describes the camera entity
#[derive(Debug, Clone, Copy)]
pub struct CameraDescription {
    pub key: &'static str,
    pub target: PollTarget,
    /// Attribute gating availability
    pub connected_attribute: &'static str,
}

/// Describes one number entity
#[derive(Debug, Clone, Copy)]
pub struct NumberDescription {
    pub key: &'static str,
    pub target: PollTarget,
    pub attribute: &'static str,
    pub converter: ValueConverter,
    pub icon: Option<&'static str>,
    pub unit: Option<&'static str>,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub mode: NumberMode,
    /// Command committing a new value to the printer
    pub command: Command,
}

/// Describes one button entity
#[derive(Debug, Clone, Copy)]
pub struct ButtonDescription {
    pub key: &'static str,
    pub icon: Option<&'static str>,
    /// Command fired when the button is pressed
    pub command: Command,
}
