//! Sensor catalog
//!
//! One entry per sensor entity, grouped by source endpoint. Keys follow
//! the original integration, including the firmware's `nozzies_num`
//! spelling; attributes are the exact wire names of the payload fields.

use crate::convert::ValueConverter;
use crate::description::{PollTarget, SensorDescription, StateClass};

const RUNNING_STATUS_OPTIONS: &[&str] =
    &["idle", "paused", "running", "busy", "completed", "error"];

const JOB_STATUS_OPTIONS: &[&str] = &["paused", "running", "completed", "stopped"];

/// All sensor entities
pub const SENSORS: &[SensorDescription] = &[
    // Printer system information
    SensorDescription::new("serial_number", PollTarget::SystemInfo, "Serial_number")
        .icon("mdi:numeric")
        .diagnostic(),
    SensorDescription::new("api_version", PollTarget::SystemInfo, "api_version")
        .icon("mdi:numeric")
        .diagnostic(),
    SensorDescription::new("battery", PollTarget::SystemInfo, "battery")
        .icon("mdi:battery-outline")
        .unit("V")
        .device_class("voltage")
        .state_class(StateClass::Measurement)
        .converter(ValueConverter::Float),
    SensorDescription::new("brightness", PollTarget::SystemInfo, "brightness")
        .icon("mdi:brightness-6")
        .converter(ValueConverter::Int),
    SensorDescription::new("date_time", PollTarget::SystemInfo, "date_time")
        .icon("mdi:calendar-clock")
        .device_class("timestamp")
        .converter(ValueConverter::Timestamp)
        .diagnostic(),
    SensorDescription::new("firmware_version", PollTarget::SystemInfo, "firmware_version")
        .diagnostic(),
    SensorDescription::new("language", PollTarget::SystemInfo, "language").diagnostic(),
    SensorDescription::new("machine_id", PollTarget::SystemInfo, "machine_id")
        .icon("mdi:printer-3d")
        .diagnostic(),
    SensorDescription::new("machine_ip", PollTarget::SystemInfo, "machine_ip").diagnostic(),
    SensorDescription::new("machine_name", PollTarget::SystemInfo, "machine_name").diagnostic(),
    SensorDescription::new("model", PollTarget::SystemInfo, "model").diagnostic(),
    SensorDescription::new("nozzies_num", PollTarget::SystemInfo, "nozzies_num")
        .icon("mdi:printer-3d-nozzle")
        .diagnostic(),
    SensorDescription::new("storage_available", PollTarget::SystemInfo, "storage_available")
        .icon("mdi:sd")
        .unit("B")
        .device_class("data_size")
        .state_class(StateClass::Measurement)
        .diagnostic(),
    SensorDescription::new("update", PollTarget::SystemInfo, "update").diagnostic(),
    SensorDescription::new("version", PollTarget::SystemInfo, "version")
        .icon("mdi:numeric")
        .diagnostic(),
    // Camera information
    SensorDescription::new("camerserver_uri", PollTarget::CameraInfo, "camerserver_URI")
        .icon("mdi:ip-network-outline")
        .diagnostic(),
    SensorDescription::new("password", PollTarget::CameraInfo, "password")
        .icon("mdi:key")
        .diagnostic(),
    // Running status
    SensorDescription::new("running_status", PollTarget::RunningStatus, "running_status")
        .icon("mdi:state-machine")
        .device_class("enum")
        .options(RUNNING_STATUS_OPTIONS),
    // Basic printer information
    SensorDescription::new("fan_cur_speed", PollTarget::BasicInfo, "fan_cur_speed")
        .icon("mdi:fan"),
    SensorDescription::new("feed_cur_rate", PollTarget::BasicInfo, "feed_cur_rate")
        .icon("mdi:printer-3d-nozzle-outline"),
    SensorDescription::new("feed_tar_rate", PollTarget::BasicInfo, "feed_tar_rate")
        .icon("mdi:printer-3d-nozzle-outline"),
    SensorDescription::new("heatbed_cur_temp", PollTarget::BasicInfo, "heatbed_cur_temp")
        .icon("mdi:heat-wave")
        .device_class("temperature")
        .state_class(StateClass::Measurement)
        .unit("°C"),
    // Nozzle state, left then right
    SensorDescription::new("ln_flow_cur_rate", PollTarget::LeftNozzle, "flow_cur_rate")
        .icon("mdi:printer-3d-nozzle-outline")
        .state_class(StateClass::Measurement)
        .unit("%"),
    SensorDescription::new("ln_nozzle_cur_temp", PollTarget::LeftNozzle, "nozzle_cur_temp")
        .icon("mdi:printer-3d-nozzle-heat")
        .device_class("temperature")
        .state_class(StateClass::Measurement)
        .unit("°C"),
    SensorDescription::new("rn_flow_cur_rate", PollTarget::RightNozzle, "flow_cur_rate")
        .icon("mdi:printer-3d-nozzle-outline")
        .state_class(StateClass::Measurement)
        .unit("%"),
    SensorDescription::new("rn_nozzle_cur_temp", PollTarget::RightNozzle, "nozzle_cur_temp")
        .icon("mdi:printer-3d-nozzle-heat")
        .device_class("temperature")
        .state_class(StateClass::Measurement)
        .unit("°C"),
    // Current job
    SensorDescription::new("file_name", PollTarget::CurrentJob, "file_name")
        .icon("mdi:file-outline"),
    SensorDescription::new("print_progress", PollTarget::CurrentJob, "print_progress")
        .state_class(StateClass::TotalIncreasing)
        .unit("%"),
    SensorDescription::new("printed_layer", PollTarget::CurrentJob, "printed_layer")
        .icon("mdi:layers")
        .state_class(StateClass::TotalIncreasing),
    SensorDescription::new("total_layer", PollTarget::CurrentJob, "total_layer")
        .icon("mdi:layers"),
    SensorDescription::new("printed_time", PollTarget::CurrentJob, "printed_time")
        .icon("mdi:clock")
        .device_class("duration")
        .unit("s"),
    SensorDescription::new("total_time", PollTarget::CurrentJob, "total_time")
        .device_class("duration")
        .unit("s"),
    SensorDescription::new("remaining_time", PollTarget::CurrentJob, "remaining_time")
        .device_class("duration")
        .unit("s"),
    SensorDescription::new("job_id", PollTarget::CurrentJob, "job_id").diagnostic(),
    SensorDescription::new("job_status", PollTarget::CurrentJob, "job_status")
        .icon("mdi:bell-circle-outline")
        .device_class("enum")
        .options(JOB_STATUS_OPTIONS),
    // Lifetime statistics
    SensorDescription::new("printed_file_num", PollTarget::Statistics, "printed_file_num")
        .icon("mdi:file-multiple-outline")
        .state_class(StateClass::Total)
        .diagnostic(),
    SensorDescription::new("printed_total_time", PollTarget::Statistics, "printed_total_time")
        .icon("mdi:timer-sand")
        .device_class("duration")
        .state_class(StateClass::TotalIncreasing)
        .unit("s")
        .diagnostic(),
    SensorDescription::new(
        "printed_used_filament_left",
        PollTarget::Statistics,
        "printed_used_filament_left",
    )
    .icon("mdi:printer-3d-nozzle-outline")
    .device_class("distance")
    .state_class(StateClass::TotalIncreasing)
    .unit("m")
    .converter(ValueConverter::Float)
    .diagnostic(),
    SensorDescription::new(
        "printed_used_filament_right",
        PollTarget::Statistics,
        "printed_used_filament_right",
    )
    .icon("mdi:printer-3d-nozzle-outline")
    .device_class("distance")
    .state_class(StateClass::TotalIncreasing)
    .unit("m")
    .converter(ValueConverter::Float)
    .diagnostic(),
    SensorDescription::new(
        "printed_used_filament",
        PollTarget::Statistics,
        "printed_used_filament",
    )
    .icon("mdi:printer-3d-nozzle-outline")
    .device_class("distance")
    .state_class(StateClass::TotalIncreasing)
    .unit("m")
    .converter(ValueConverter::Float)
    .diagnostic(),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_count() {
        assert_eq!(SENSORS.len(), 40);
    }

    #[test]
    fn test_nozzle_sensors_share_wire_attributes() {
        let left: Vec<_> = SENSORS
            .iter()
            .filter(|d| d.target == PollTarget::LeftNozzle)
            .collect();
        let right: Vec<_> = SENSORS
            .iter()
            .filter(|d| d.target == PollTarget::RightNozzle)
            .collect();
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        for (l, r) in left.iter().zip(&right) {
            assert_eq!(l.attribute, r.attribute);
        }
    }

    #[test]
    fn test_enum_sensors_carry_options() {
        let running = SENSORS
            .iter()
            .find(|d| d.key == "running_status")
            .unwrap();
        assert_eq!(running.options.unwrap().len(), 6);

        let job = SENSORS.iter().find(|d| d.key == "job_status").unwrap();
        assert_eq!(job.options.unwrap().len(), 4);
    }

    #[test]
    fn test_wire_attribute_spellings_preserved() {
        let serial = SENSORS.iter().find(|d| d.key == "serial_number").unwrap();
        assert_eq!(serial.attribute, "Serial_number");

        let uri = SENSORS.iter().find(|d| d.key == "camerserver_uri").unwrap();
        assert_eq!(uri.attribute, "camerserver_URI");
    }
}
