//! Printer status enums and value normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overall printer state reported by `/printer/runningstatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunningStatus {
    Idle,
    Paused,
    Running,
    Busy,
    Completed,
    Error,
}

impl RunningStatus {
    pub const ALL: [RunningStatus; 6] = [
        RunningStatus::Idle,
        RunningStatus::Paused,
        RunningStatus::Running,
        RunningStatus::Busy,
        RunningStatus::Completed,
        RunningStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunningStatus::Idle => "idle",
            RunningStatus::Paused => "paused",
            RunningStatus::Running => "running",
            RunningStatus::Busy => "busy",
            RunningStatus::Completed => "completed",
            RunningStatus::Error => "error",
        }
    }
}

impl fmt::Display for RunningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the current print job reported by `/job/currentjob`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Paused,
    Running,
    Completed,
    Stopped,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Paused,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Stopped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Paused => "paused",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation accepted by POST `/job/currentjob?operate=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    Pause,
    Resume,
    Stop,
}

impl JobAction {
    pub const ALL: [JobAction; 3] = [JobAction::Pause, JobAction::Resume, JobAction::Stop];

    /// The wire value passed as the `operate` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Pause => "pause",
            JobAction::Resume => "resume",
            JobAction::Stop => "stop",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pause" => Ok(JobAction::Pause),
            "resume" => Ok(JobAction::Resume),
            "stop" => Ok(JobAction::Stop),
            other => Err(format!("unknown job action: {other}")),
        }
    }
}

/// Normalize a raw payload value: the printer pads absent values with
/// empty or whitespace-only strings, which are treated as missing.
pub fn normalize_value(value: &serde_json::Value) -> Option<serde_json::Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        other => Some(other.clone()),
    }
}

/// Turn a display name into a valid object-id fragment
///
/// Lowercases, maps every other character to `_`, collapses runs and trims
/// the ends, so "Garage Pro2 " becomes "garage_pro2".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_running_status_serde() {
        let status: RunningStatus = serde_json::from_str("\"busy\"").unwrap();
        assert_eq!(status, RunningStatus::Busy);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"busy\"");
    }

    #[test]
    fn test_job_action_wire_values() {
        assert_eq!(JobAction::Pause.as_str(), "pause");
        assert_eq!(JobAction::Resume.as_str(), "resume");
        assert_eq!(JobAction::Stop.as_str(), "stop");
        assert_eq!("resume".parse::<JobAction>().unwrap(), JobAction::Resume);
        assert!("restart".parse::<JobAction>().is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Garage Pro2"), "garage_pro2");
        assert_eq!(slugify("  Mock Pro2 "), "mock_pro2");
        assert_eq!(slugify("E2-Plus (lab)"), "e2_plus_lab");
        assert_eq!(slugify("___"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&json!("")), None);
        assert_eq!(normalize_value(&json!("   ")), None);
        assert_eq!(normalize_value(&json!(null)), None);
        assert_eq!(normalize_value(&json!("E2-123")), Some(json!("E2-123")));
        assert_eq!(normalize_value(&json!(0)), Some(json!(0)));
    }
}
