//! Per-station high/low aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Temperature bounds observed for one station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationBounds {
    pub high: f64,
    pub low: f64,
}

impl StationBounds {
    /// Both bounds start at the first observed temperature.
    pub fn new(temperature: f64) -> Self {
        Self {
            high: temperature,
            low: temperature,
        }
    }

    fn widen(&mut self, temperature: f64) {
        if temperature > self.high {
            self.high = temperature;
        }
        if temperature < self.low {
            self.low = temperature;
        }
    }
}

/// Map of station name to bounds. Keyed by name; ordering is for stable output only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stations {
    bounds: BTreeMap<String, StationBounds>,
}

impl Stations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one temperature into `station` and return its updated bounds.
    pub fn merge(&mut self, station: &str, temperature: f64) -> StationBounds {
        match self.bounds.get_mut(station) {
            Some(bounds) => {
                bounds.widen(temperature);
                *bounds
            }
            None => {
                let bounds = StationBounds::new(temperature);
                self.bounds.insert(station.to_string(), bounds);
                bounds
            }
        }
    }

    pub fn clear(&mut self) {
        self.bounds.clear();
    }

    #[cfg(test)]
    pub fn get(&self, station: &str) -> Option<&StationBounds> {
        self.bounds.get(station)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Detached copy of the current bounds.
    pub fn to_map(&self) -> BTreeMap<String, StationBounds> {
        self.bounds.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_sample_sets_both_bounds() {
        let mut stations = Stations::new();
        let bounds = stations.merge("Foster", 37.1);
        assert_eq!(bounds, StationBounds { high: 37.1, low: 37.1 });
        assert_eq!(stations.len(), 1);
    }

    #[test]
    fn merging_same_sample_twice_is_idempotent() {
        let mut stations = Stations::new();
        stations.merge("Foster", 37.1);
        stations.merge("Foster", 27.1);
        let before = *stations.get("Foster").unwrap();

        stations.merge("Foster", 27.1);
        assert_eq!(stations.get("Foster"), Some(&before));
    }

    #[test]
    fn bounds_only_widen() {
        let mut stations = Stations::new();
        let temps = [50.0, 40.0, 60.0, 55.0, 39.5, 61.0, 45.0];

        let mut prev = stations.merge("Desert", temps[0]);
        for t in &temps[1..] {
            let next = stations.merge("Desert", *t);
            assert!(next.high >= prev.high, "high shrank at {}", t);
            assert!(next.low <= prev.low, "low grew at {}", t);
            prev = next;
        }
        assert_eq!(prev, StationBounds { high: 61.0, low: 39.5 });
    }

    #[test]
    fn stations_are_tracked_independently() {
        let mut stations = Stations::new();
        stations.merge("Foster", 37.1);
        stations.merge("Desert", 100.0);
        stations.merge("Foster", 27.1);
        stations.merge("Desert", 110.0);

        assert_eq!(stations.get("Foster"), Some(&StationBounds { high: 37.1, low: 27.1 }));
        assert_eq!(stations.get("Desert"), Some(&StationBounds { high: 110.0, low: 100.0 }));
    }

    #[test]
    fn clear_empties_everything() {
        let mut stations = Stations::new();
        stations.merge("Foster", 37.1);
        stations.clear();
        assert!(stations.is_empty());
        assert_eq!(stations.get("Foster"), None);
    }

    #[test]
    fn copied_map_is_detached() {
        let mut stations = Stations::new();
        stations.merge("Foster", 37.1);
        let copy = stations.to_map();

        stations.merge("Foster", 99.0);
        assert_eq!(copy["Foster"], StationBounds { high: 37.1, low: 37.1 });
    }
}
