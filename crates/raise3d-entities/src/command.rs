//! Commands forwarded to the printer
//!
//! Every number and button entity resolves to exactly one command. Numbers
//! carry a value; the printer accepts integers on all set endpoints, so
//! values are rounded before dispatch.

use thiserror::Error;

use raise3d_api::{ApiError, AxisControl, PrinterClient};
use raise3d_core::JobAction;

use crate::description::PollTarget;

/// Which of the two extruders a nozzle command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nozzle {
    Left,
    Right,
}

/// A movable axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Errors from dispatching a command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command requires a value")]
    MissingValue,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A printer-side action bound to a number or button entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetHeatbedTemp,
    SetFanSpeed,
    SetNozzleTemp(Nozzle),
    SetNozzleFlowrate(Nozzle),
    MoveHome,
    JogAxis { axis: Axis, delta: i64 },
    JobAction(JobAction),
    RecoverLastJob,
}

impl Command {
    /// Whether dispatch needs a numeric value
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            Command::SetHeatbedTemp
                | Command::SetFanSpeed
                | Command::SetNozzleTemp(_)
                | Command::SetNozzleFlowrate(_)
        )
    }

    /// The endpoint whose data changes once the printer applied the command
    pub fn refresh_target(&self) -> Option<PollTarget> {
        match self {
            Command::SetHeatbedTemp | Command::SetFanSpeed => Some(PollTarget::BasicInfo),
            Command::SetNozzleTemp(Nozzle::Left) | Command::SetNozzleFlowrate(Nozzle::Left) => {
                Some(PollTarget::LeftNozzle)
            }
            Command::SetNozzleTemp(Nozzle::Right) | Command::SetNozzleFlowrate(Nozzle::Right) => {
                Some(PollTarget::RightNozzle)
            }
            Command::JobAction(_) | Command::RecoverLastJob => Some(PollTarget::CurrentJob),
            Command::MoveHome | Command::JogAxis { .. } => None,
        }
    }

    /// Execute the command against the printer
    pub async fn dispatch(
        &self,
        client: &PrinterClient,
        value: Option<f64>,
    ) -> Result<(), CommandError> {
        let int_value = || -> Result<i64, CommandError> {
            value
                .map(|v| v.round() as i64)
                .ok_or(CommandError::MissingValue)
        };

        match self {
            Command::SetHeatbedTemp => {
                client.set_heatbed_temp(int_value()?).await?;
            }
            Command::SetFanSpeed => {
                client.set_fan_speed(int_value()?).await?;
            }
            Command::SetNozzleTemp(Nozzle::Left) => {
                client.set_left_nozzle_temp(int_value()?).await?;
            }
            Command::SetNozzleTemp(Nozzle::Right) => {
                client.set_right_nozzle_temp(int_value()?).await?;
            }
            Command::SetNozzleFlowrate(Nozzle::Left) => {
                client.set_left_nozzle_flowrate(int_value()?).await?;
            }
            Command::SetNozzleFlowrate(Nozzle::Right) => {
                client.set_right_nozzle_flowrate(int_value()?).await?;
            }
            Command::MoveHome => {
                client.move_home().await?;
            }
            Command::JogAxis { axis, delta } => {
                let control = match axis {
                    Axis::X => AxisControl::relative().x(*delta),
                    Axis::Y => AxisControl::relative().y(*delta),
                    Axis::Z => AxisControl::relative().z(*delta),
                };
                client.axis_control(&control).await?;
            }
            Command::JobAction(action) => {
                client.set_current_job(*action).await?;
            }
            Command::RecoverLastJob => {
                client.recover_last_job().await?;
            }
        }
        Ok(())
    }
}
