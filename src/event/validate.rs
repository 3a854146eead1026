//! Strict schema check for raw records.
//!
//! Rules, in order:
//! 1) the record must be a JSON object;
//! 2) `type` must be the string "sample" or "control";
//! 3) the fields of that variant are each checked, and every failure is kept.
//!
//! Nothing is coerced except integer temperatures, which widen to f64.

use crate::event::record::{ControlEvent, InputEvent, SampleEvent};
use serde_json::{Map, Value};
use std::fmt;

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn missing(field: &'static str) -> Self {
        Self::new(field, "field required")
    }

    fn wrong_type(field: &'static str, expected: &str, got: &Value) -> Self {
        Self::new(field, format!("expected {}, got {}", expected, describe(got)))
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every issue found in a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssues(pub Vec<FieldIssue>);

impl fmt::Display for FieldIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// A record that does not match any known event shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} record: {issues}")]
pub struct ValidationError {
    /// "sample" or "control" once `type` is known, otherwise "event".
    pub kind: &'static str,
    pub issues: FieldIssues,
}

impl ValidationError {
    fn single(issue: FieldIssue) -> Self {
        Self {
            kind: "event",
            issues: FieldIssues(vec![issue]),
        }
    }

    /// Names of the offending fields, in check order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.0.iter().map(|issue| issue.field).collect()
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues.0
    }
}

/// Validate an untyped record into an `InputEvent`.
pub fn validate(raw: &Value) -> Result<InputEvent, ValidationError> {
    let Some(obj) = raw.as_object() else {
        return Err(ValidationError::single(FieldIssue::wrong_type(
            "record",
            "a JSON object",
            raw,
        )));
    };

    let kind = match obj.get("type") {
        None => return Err(ValidationError::single(FieldIssue::missing("type"))),
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => {
            return Err(ValidationError::single(FieldIssue::wrong_type(
                "type", "a string", other,
            )));
        }
    };

    match kind {
        "sample" => validate_sample(obj).map(InputEvent::Sample),
        "control" => validate_control(obj).map(InputEvent::Control),
        other => Err(ValidationError::single(FieldIssue::new(
            "type",
            format!("unknown event type {:?}, expected \"sample\" or \"control\"", other),
        ))),
    }
}

fn validate_sample(obj: &Map<String, Value>) -> Result<SampleEvent, ValidationError> {
    let mut issues = Vec::new();

    let station_name = match obj.get("stationName") {
        Some(Value::String(name)) if name.is_empty() => {
            issues.push(FieldIssue::new("stationName", "must not be empty"));
            None
        }
        other => string_field("stationName", other, &mut issues),
    };
    let timestamp = integer_field("timestamp", obj.get("timestamp"), &mut issues);
    let temperature = number_field("temperature", obj.get("temperature"), &mut issues);

    match (station_name, timestamp, temperature) {
        (Some(station_name), Some(timestamp), Some(temperature)) if issues.is_empty() => {
            Ok(SampleEvent {
                station_name,
                timestamp,
                temperature,
            })
        }
        _ => Err(ValidationError {
            kind: "sample",
            issues: FieldIssues(issues),
        }),
    }
}

fn validate_control(obj: &Map<String, Value>) -> Result<ControlEvent, ValidationError> {
    let mut issues = Vec::new();

    match string_field("command", obj.get("command"), &mut issues) {
        Some(command) => Ok(ControlEvent {
            command: command.into(),
        }),
        None => Err(ValidationError {
            kind: "control",
            issues: FieldIssues(issues),
        }),
    }
}

fn string_field(
    field: &'static str,
    value: Option<&Value>,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(FieldIssue::wrong_type(field, "a string", other));
            None
        }
        None => {
            issues.push(FieldIssue::missing(field));
            None
        }
    }
}

/// Accepts JSON integers that fit in i64; `1000.0` is a float and is rejected.
fn integer_field(
    field: &'static str,
    value: Option<&Value>,
    issues: &mut Vec<FieldIssue>,
) -> Option<i64> {
    match value {
        Some(Value::Number(n)) if n.is_i64() => n.as_i64(),
        Some(Value::Number(n)) if n.is_u64() => {
            issues.push(FieldIssue::new(field, "integer out of range"));
            None
        }
        Some(other) => {
            issues.push(FieldIssue::wrong_type(field, "an integer", other));
            None
        }
        None => {
            issues.push(FieldIssue::missing(field));
            None
        }
    }
}

fn number_field(
    field: &'static str,
    value: Option<&Value>,
    issues: &mut Vec<FieldIssue>,
) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => Some(v),
            None => {
                issues.push(FieldIssue::new(field, "number is not representable as f64"));
                None
            }
        },
        Some(other) => {
            issues.push(FieldIssue::wrong_type(field, "a number", other));
            None
        }
        None => {
            issues.push(FieldIssue::missing(field));
            None
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
