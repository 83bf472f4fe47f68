//! Colony fixture files consumed by the CLI.
//!
//! A fixture stands in for the live host: recorded history per series, the
//! current readings, colonist break thresholds, and findings for subsystems
//! the engine does not forecast (power, defense, ...).
//!
//! ```json
//! {
//!   "now": 60000,
//!   "series": { "food": [{"timestamp": 0, "value": 30.0}] },
//!   "current": { "food": 20.0, "mood:Human1": 0.4 },
//!   "floors": {
//!     "Human1": 0.2,
//!     "Human2": {"extreme": 0.05, "major": 0.2, "minor": 0.3}
//!   },
//!   "negative_mood": { "Human1": -12.0 },
//!   "subsystems": [{"subsystem": "power", "band": "warning"}]
//! }
//! ```

use cw_common::{SeriesKey, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::health::SubsystemFinding;
use crate::store::{BreakThresholds, MemorySnapshotStore};

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid fixture: {0}")]
    Invalid(String),

    #[error(transparent)]
    Engine(#[from] cw_common::Error),
}

/// Parsed fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColonyFixture {
    /// Current tick; defaults to the newest recorded sample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<u64>,

    #[serde(default)]
    pub series: BTreeMap<String, Vec<Snapshot>>,

    #[serde(default)]
    pub current: BTreeMap<String, f64>,

    /// Break thresholds per colonist: a bare number is the extreme
    /// threshold alone.
    #[serde(default)]
    pub floors: HashMap<String, BreakThresholds>,

    /// Sum of active negative thought offsets per colonist.
    #[serde(default)]
    pub negative_mood: HashMap<String, f64>,

    #[serde(default)]
    pub subsystems: Vec<SubsystemFinding>,
}

impl ColonyFixture {
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let fixture = Self::parse_json(&content)?;
        debug!(
            path = %path.display(),
            series = fixture.series.len(),
            readings = fixture.current.len(),
            "loaded fixture"
        );
        Ok(fixture)
    }

    pub fn parse_json(json: &str) -> Result<Self, FixtureError> {
        let fixture: ColonyFixture = serde_json::from_str(json)?;
        for (key, value) in &fixture.current {
            if !value.is_finite() {
                return Err(FixtureError::Invalid(format!(
                    "current value for {} is not finite",
                    key
                )));
            }
        }
        Ok(fixture)
    }

    /// Load every series into a fresh store, keeping at least `retention`
    /// samples per series.
    pub fn to_store(&self, retention: usize) -> Result<MemorySnapshotStore, FixtureError> {
        let longest = self.series.values().map(Vec::len).max().unwrap_or(0);
        let store = MemorySnapshotStore::new(retention.max(longest));
        for (key, samples) in &self.series {
            store.record_all(&SeriesKey::from(key.as_str()), samples.iter().copied())?;
        }
        Ok(store)
    }

    /// Current tick: explicit, or the newest sample across all series.
    pub fn now(&self) -> u64 {
        self.now.unwrap_or_else(|| {
            self.series
                .values()
                .filter_map(|s| s.last())
                .map(|s| s.timestamp)
                .max()
                .unwrap_or(0)
        })
    }

    /// Current reading for a series, else its newest recorded value.
    pub fn current_value(&self, key: &SeriesKey) -> Option<f64> {
        self.current
            .get(key.as_str())
            .copied()
            .or_else(|| self.series.get(key.as_str())?.last().map(|s| s.value))
    }

    /// Entity ids with a reading or history in `domain`, sorted.
    pub fn entities(&self, domain: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .current
            .keys()
            .chain(self.series.keys())
            .map(|k| SeriesKey::from(k.as_str()))
            .filter(|k| k.domain_name() == domain)
            .filter_map(|k| k.entity_id().map(str::to_string))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn negative_thoughts(&self, entity_id: &str) -> f64 {
        self.negative_mood.get(entity_id).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SnapshotStore;

    const FIXTURE: &str = r#"{
        "series": {
            "food": [{"timestamp": 0, "value": 30.0}, {"timestamp": 60000, "value": 20.0}],
            "mood:Human2": [{"timestamp": 2500, "value": 0.5}]
        },
        "current": {"mood:Human1": 0.4, "steel": 120.0},
        "floors": {"Human1": 0.2},
        "subsystems": [{"subsystem": "power", "band": "warning", "issues": ["Low battery"]}]
    }"#;

    #[test]
    fn test_parse_and_store() {
        let fixture = ColonyFixture::parse_json(FIXTURE).unwrap();
        let store = fixture.to_store(4).unwrap();
        let food = store.history(&SeriesKey::domain("food"), None).unwrap();
        assert_eq!(food.len(), 2);
        assert_eq!(fixture.now(), 60_000);
        assert_eq!(fixture.subsystems[0].issues, vec!["Low battery"]);
    }

    #[test]
    fn test_current_value_falls_back_to_history() {
        let fixture = ColonyFixture::parse_json(FIXTURE).unwrap();
        assert_eq!(fixture.current_value(&SeriesKey::domain("food")), Some(20.0));
        assert_eq!(fixture.current_value(&SeriesKey::domain("steel")), Some(120.0));
        assert_eq!(fixture.current_value(&SeriesKey::domain("wood")), None);
    }

    #[test]
    fn test_entities_from_readings_and_history() {
        let fixture = ColonyFixture::parse_json(FIXTURE).unwrap();
        assert_eq!(fixture.entities("mood"), vec!["Human1", "Human2"]);
        assert!(fixture.entities("health").is_empty());
    }

    #[test]
    fn test_out_of_order_series_rejected() {
        let json = r#"{"series": {"food": [{"timestamp": 10, "value": 1.0}, {"timestamp": 5, "value": 2.0}]}}"#;
        let fixture = ColonyFixture::parse_json(json).unwrap();
        let err = fixture.to_store(10).unwrap_err();
        assert!(matches!(
            err,
            FixtureError::Engine(cw_common::Error::OutOfOrderSnapshot { .. })
        ));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            ColonyFixture::parse_json("{not json"),
            Err(FixtureError::Parse(_))
        ));
    }

    #[test]
    fn test_floors_accept_full_thresholds() {
        let json = r#"{"floors": {"Human1": 0.2, "Human2": {"extreme": 0.05, "major": 0.2, "minor": 0.3}}}"#;
        let fixture = ColonyFixture::parse_json(json).unwrap();
        assert_eq!(fixture.floors["Human1"], BreakThresholds::extreme_only(0.2));
        assert_eq!(
            fixture.floors["Human2"],
            BreakThresholds::new(0.05, 0.2, 0.3)
        );
    }

    #[test]
    fn test_explicit_now_wins() {
        let fixture = ColonyFixture::parse_json(r#"{"now": 99}"#).unwrap();
        assert_eq!(fixture.now(), 99);
    }
}
