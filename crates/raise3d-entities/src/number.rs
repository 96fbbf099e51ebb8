//! Number catalog
//!
//! Numbers mirror the printer's target values and commit changes through
//! their command. The printer accepts integers everywhere, so step is 1.

use crate::command::{Command, Nozzle};
use crate::convert::ValueConverter;
use crate::description::{NumberDescription, NumberMode, PollTarget};

/// All number entities
pub const NUMBERS: &[NumberDescription] = &[
    NumberDescription {
        key: "heatbed_tar_temp",
        target: PollTarget::BasicInfo,
        attribute: "heatbed_tar_temp",
        converter: ValueConverter::Float,
        icon: Some("mdi:heat-wave"),
        unit: Some("°C"),
        min: 0.0,
        max: 110.0,
        step: 1.0,
        mode: NumberMode::Box,
        command: Command::SetHeatbedTemp,
    },
    NumberDescription {
        key: "fan_tar_speed",
        target: PollTarget::BasicInfo,
        attribute: "fan_tar_speed",
        converter: ValueConverter::Float,
        icon: Some("mdi:fan"),
        unit: Some("%"),
        min: 0.0,
        max: 100.0,
        step: 1.0,
        mode: NumberMode::Box,
        command: Command::SetFanSpeed,
    },
    NumberDescription {
        key: "ln_flow_tar_rate",
        target: PollTarget::LeftNozzle,
        attribute: "flow_tar_rate",
        converter: ValueConverter::Float,
        icon: Some("mdi:printer-3d-nozzle-outline"),
        unit: Some("%"),
        min: 1.0,
        max: 300.0,
        step: 1.0,
        mode: NumberMode::Box,
        command: Command::SetNozzleFlowrate(Nozzle::Left),
    },
    NumberDescription {
        key: "ln_nozzle_tar_temp",
        target: PollTarget::LeftNozzle,
        attribute: "nozzle_tar_temp",
        converter: ValueConverter::Float,
        icon: Some("mdi:printer-3d-nozzle-heat"),
        unit: Some("°C"),
        min: 0.0,
        max: 300.0,
        step: 1.0,
        mode: NumberMode::Box,
        command: Command::SetNozzleTemp(Nozzle::Left),
    },
    NumberDescription {
        key: "rn_flow_tar_rate",
        target: PollTarget::RightNozzle,
        attribute: "flow_tar_rate",
        converter: ValueConverter::Float,
        icon: Some("mdi:printer-3d-nozzle-outline"),
        unit: Some("%"),
        min: 1.0,
        max: 300.0,
        step: 1.0,
        mode: NumberMode::Box,
        command: Command::SetNozzleFlowrate(Nozzle::Right),
    },
    NumberDescription {
        key: "rn_nozzle_tar_temp",
        target: PollTarget::RightNozzle,
        attribute: "nozzle_tar_temp",
        converter: ValueConverter::Float,
        icon: Some("mdi:printer-3d-nozzle-heat"),
        unit: Some("°C"),
        min: 0.0,
        max: 300.0,
        step: 1.0,
        mode: NumberMode::Box,
        command: Command::SetNozzleTemp(Nozzle::Right),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_count() {
        assert_eq!(NUMBERS.len(), 6);
    }

    #[test]
    fn test_every_number_command_requires_a_value() {
        for desc in NUMBERS {
            assert!(
                desc.command.requires_value(),
                "number {} has a valueless command",
                desc.key
            );
        }
    }

    #[test]
    fn test_ranges_are_sane() {
        for desc in NUMBERS {
            assert!(desc.min < desc.max, "number {} range inverted", desc.key);
            assert!(desc.step > 0.0);
        }
    }
}
