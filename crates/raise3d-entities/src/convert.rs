//! Payload value converters
//!
//! Converters are data, not closures, so entity tables stay const and the
//! conversion behavior stays testable in isolation. Every converter treats
//! blank strings as missing values, the way the printer pads absent fields.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use raise3d_core::normalize_value;

/// How a raw payload attribute becomes an entity value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConverter {
    /// Pass through, dropping blank strings
    Trimmed,
    /// Coerce to a float
    Float,
    /// Coerce to an integer
    Int,
    /// Accept booleans and the strings "true"/"false"
    BoolLike,
    /// Parse the printer's "%Y-%m-%d %H:%M:%S" clock format as UTC
    Timestamp,
}

impl ValueConverter {
    /// Apply the conversion; None means the value is absent or unparseable
    pub fn apply(&self, value: &Value) -> Option<Value> {
        let value = normalize_value(value)?;
        match self {
            ValueConverter::Trimmed => Some(value),
            ValueConverter::Float => as_f64(&value)
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            ValueConverter::Int => as_i64(&value).map(Value::from),
            ValueConverter::BoolLike => Some(Value::Bool(as_bool(&value))),
            ValueConverter::Timestamp => {
                let raw = value.as_str()?;
                let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()?;
                Some(Value::String(parsed.and_utc().to_rfc3339()))
            }
        }
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
