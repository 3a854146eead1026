//! Output records and the pure builders for derived outputs.
//!
//! JSON shapes:
//! {"type": "sample", "stationName": ..., "timestamp": ..., "temperature": ...}
//! {"type": "snapshot", "asOf": 1010, "stations": {"Foster": {"high": 37.1, "low": 27.1}}}
//! {"type": "reset", "asOf": 1010}

use crate::event::SampleEvent;
use crate::station::{StationBounds, Stations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOutput {
    /// Timestamp of the latest sample folded into `stations`.
    pub as_of: i64,
    pub stations: BTreeMap<String, StationBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetOutput {
    /// Timestamp of the latest sample received before the reset.
    pub as_of: i64,
}

/// Everything the dispatcher can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Output {
    /// Pass-through acknowledgement of an accepted sample.
    Sample(SampleEvent),
    Snapshot(SnapshotOutput),
    Reset(ResetOutput),
}

impl Output {
    pub fn kind(&self) -> &'static str {
        match self {
            Output::Sample(_) => "sample",
            Output::Snapshot(_) => "snapshot",
            Output::Reset(_) => "reset",
        }
    }
}

/// Copy the current bounds into a snapshot stamped `as_of`.
pub fn build_snapshot(stations: &Stations, as_of: i64) -> SnapshotOutput {
    SnapshotOutput {
        as_of,
        stations: stations.to_map(),
    }
}

pub fn build_reset(as_of: i64) -> ResetOutput {
    ResetOutput { as_of }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn snapshot_wire_shape() {
        let mut stations = Stations::new();
        stations.merge("Foster Weather Station", 37.1);
        stations.merge("Foster Weather Station", 32.5);

        let out = Output::Snapshot(build_snapshot(&stations, 1_672_531_200_000));
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({
                "type": "snapshot",
                "asOf": 1_672_531_200_000i64,
                "stations": {
                    "Foster Weather Station": {"high": 37.1, "low": 32.5}
                }
            })
        );
    }

    #[test]
    fn reset_wire_shape() {
        let out = Output::Reset(build_reset(1_672_531_200_000));
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"type": "reset", "asOf": 1_672_531_200_000i64})
        );
    }

    #[test]
    fn outputs_read_back_from_json() {
        let snapshot: Output = serde_json::from_value(json!({
            "type": "snapshot",
            "asOf": 1010,
            "stations": {"Desert": {"high": 110.0, "low": 100.0}}
        }))
        .unwrap();
        assert_eq!(snapshot.kind(), "snapshot");

        let reset: Output = serde_json::from_value(json!({"type": "reset", "asOf": 1010})).unwrap();
        assert_eq!(reset, Output::Reset(ResetOutput { as_of: 1010 }));
    }

    #[test]
    fn snapshot_does_not_track_later_merges() {
        let mut stations = Stations::new();
        stations.merge("Foster", 37.1);
        let snapshot = build_snapshot(&stations, 1000);

        stations.merge("Foster", 12.0);
        stations.merge("Desert", 100.0);
        assert_eq!(
            snapshot.stations,
            BTreeMap::from([("Foster".to_string(), StationBounds::new(37.1))])
        );
    }
}
