//! Button catalog

use raise3d_core::JobAction;

use crate::command::{Axis, Command};
use crate::description::ButtonDescription;

/// All button entities
pub const BUTTONS: &[ButtonDescription] = &[
    ButtonDescription {
        key: "recover_last_job",
        icon: Some("mdi:restart"),
        command: Command::RecoverLastJob,
    },
    ButtonDescription {
        key: "move_home",
        icon: Some("mdi:home"),
        command: Command::MoveHome,
    },
    ButtonDescription {
        key: "move_negative_x",
        icon: Some("mdi:cursor-move"),
        command: Command::JogAxis {
            axis: Axis::X,
            delta: -1,
        },
    },
    ButtonDescription {
        key: "move_positive_x",
        icon: Some("mdi:cursor-move"),
        command: Command::JogAxis {
            axis: Axis::X,
            delta: 1,
        },
    },
    ButtonDescription {
        key: "move_negative_y",
        icon: Some("mdi:cursor-move"),
        command: Command::JogAxis {
            axis: Axis::Y,
            delta: -1,
        },
    },
    ButtonDescription {
        key: "move_positive_y",
        icon: Some("mdi:cursor-move"),
        command: Command::JogAxis {
            axis: Axis::Y,
            delta: 1,
        },
    },
    ButtonDescription {
        key: "move_negative_z",
        icon: Some("mdi:cursor-move"),
        command: Command::JogAxis {
            axis: Axis::Z,
            delta: -1,
        },
    },
    ButtonDescription {
        key: "move_positive_z",
        icon: Some("mdi:cursor-move"),
        command: Command::JogAxis {
            axis: Axis::Z,
            delta: 1,
        },
    },
    ButtonDescription {
        key: "job_action_pause",
        icon: Some("mdi:pause"),
        command: Command::JobAction(JobAction::Pause),
    },
    ButtonDescription {
        key: "job_action_resume",
        icon: Some("mdi:play"),
        command: Command::JobAction(JobAction::Resume),
    },
    ButtonDescription {
        key: "job_action_stop",
        icon: Some("mdi:stop"),
        command: Command::JobAction(JobAction::Stop),
    },
];
