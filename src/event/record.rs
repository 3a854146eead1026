//! Input record shapes.
//!
//! JSON shape:
//! {"type": "sample", "stationName": "Foster", "timestamp": 1000, "temperature": 37.1}
//! {"type": "control", "command": "snapshot"}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single temperature reading from a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleEvent {
    pub station_name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub temperature: f64,
}

/// An operator command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub command: Command,
}

/// Known commands plus a catch-all for commands this build does not act on.
///
/// `Other` keeps the raw string so it round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Command {
    Snapshot,
    Reset,
    Other(String),
}

impl Command {
    pub fn as_str(&self) -> &str {
        match self {
            Command::Snapshot => "snapshot",
            Command::Reset => "reset",
            Command::Other(raw) => raw,
        }
    }
}

impl From<String> for Command {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "snapshot" => Command::Snapshot,
            "reset" => Command::Reset,
            _ => Command::Other(raw),
        }
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        match command {
            Command::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated input record, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    Sample(SampleEvent),
    Control(ControlEvent),
}
