//! Host-facing seams: the snapshot store and the floor lookup.
//!
//! The engine only reads through these traits. Missing history is an empty
//! result, never an error; a store that cannot answer returns
//! [`Error::StoreUnavailable`].

use cw_common::{Error, Result, SeriesKey, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use tracing::trace;

/// Read access to recorded history.
pub trait SnapshotStore {
    /// Up to `max_samples` newest samples for `key`, oldest first.
    /// `None` returns everything retained.
    fn history(&self, key: &SeriesKey, max_samples: Option<usize>) -> Result<Vec<Snapshot>>;

    /// Value recorded `samples_ago` samples before the newest (0 = newest).
    fn snapshot(&self, key: &SeriesKey, samples_ago: usize) -> Result<Option<f64>> {
        let history = self.history(key, Some(samples_ago.saturating_add(1)))?;
        if history.len() <= samples_ago {
            return Ok(None);
        }
        Ok(history.get(history.len() - 1 - samples_ago).map(|s| s.value))
    }
}

/// A colonist's break thresholds, most severe first.
///
/// `extreme` is the forecast floor. `major` and `minor` are optional; when
/// the host has no value the adapter keeps its configured offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ThresholdsRepr", into = "ThresholdsRepr")]
pub struct BreakThresholds {
    pub extreme: f64,
    pub major: Option<f64>,
    pub minor: Option<f64>,
}

impl BreakThresholds {
    pub fn extreme_only(extreme: f64) -> Self {
        BreakThresholds {
            extreme,
            major: None,
            minor: None,
        }
    }

    pub fn new(extreme: f64, major: f64, minor: f64) -> Self {
        BreakThresholds {
            extreme,
            major: Some(major),
            minor: Some(minor),
        }
    }
}

/// Fixture form: a bare number is the extreme threshold alone.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ThresholdsRepr {
    Extreme(f64),
    Full {
        extreme: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        major: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minor: Option<f64>,
    },
}

impl From<ThresholdsRepr> for BreakThresholds {
    fn from(repr: ThresholdsRepr) -> Self {
        match repr {
            ThresholdsRepr::Extreme(extreme) => BreakThresholds::extreme_only(extreme),
            ThresholdsRepr::Full {
                extreme,
                major,
                minor,
            } => BreakThresholds {
                extreme,
                major,
                minor,
            },
        }
    }
}

impl From<BreakThresholds> for ThresholdsRepr {
    fn from(t: BreakThresholds) -> Self {
        match (t.major, t.minor) {
            (None, None) => ThresholdsRepr::Extreme(t.extreme),
            (major, minor) => ThresholdsRepr::Full {
                extreme: t.extreme,
                major,
                minor,
            },
        }
    }
}

/// Entity-specific floor (e.g. a colonist's extreme break threshold).
///
/// Read on every call. Implementations must not cache on the engine's
/// behalf; the floor can move over the entity's lifetime.
pub trait FloorLookup {
    fn current_floor(&self, entity_id: &str) -> Result<f64>;

    /// All break thresholds for the entity. Hosts that only know the
    /// floor get the extreme threshold alone.
    fn break_thresholds(&self, entity_id: &str) -> Result<BreakThresholds> {
        self.current_floor(entity_id).map(BreakThresholds::extreme_only)
    }
}

impl<F> FloorLookup for F
where
    F: Fn(&str) -> Result<f64>,
{
    fn current_floor(&self, entity_id: &str) -> Result<f64> {
        self(entity_id)
    }
}

fn not_found(entity_id: &str) -> Error {
    Error::EntityNotFound {
        entity_id: entity_id.to_string(),
    }
}

impl FloorLookup for HashMap<String, f64> {
    fn current_floor(&self, entity_id: &str) -> Result<f64> {
        self.get(entity_id)
            .copied()
            .ok_or_else(|| not_found(entity_id))
    }
}

impl FloorLookup for HashMap<String, BreakThresholds> {
    fn current_floor(&self, entity_id: &str) -> Result<f64> {
        self.break_thresholds(entity_id).map(|t| t.extreme)
    }

    fn break_thresholds(&self, entity_id: &str) -> Result<BreakThresholds> {
        self.get(entity_id)
            .copied()
            .ok_or_else(|| not_found(entity_id))
    }
}

/// In-memory store with bounded per-series retention.
///
/// Appends must be in timestamp order; equal timestamps are accepted.
#[derive(Debug)]
pub struct MemorySnapshotStore {
    retention: usize,
    series: RwLock<HashMap<SeriesKey, VecDeque<Snapshot>>>,
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        MemorySnapshotStore::new(DEFAULT_RETENTION)
    }
}

/// Three days of hourly samples.
pub const DEFAULT_RETENTION: usize = 72;

impl MemorySnapshotStore {
    pub fn new(retention: usize) -> Self {
        MemorySnapshotStore {
            retention: retention.max(1),
            series: RwLock::new(HashMap::new()),
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Append a sample, evicting the oldest once retention is reached.
    pub fn record(&self, key: &SeriesKey, snapshot: Snapshot) -> Result<()> {
        if !snapshot.value.is_finite() {
            return Err(Error::NonFiniteValue {
                field: format!("{}@{}", key, snapshot.timestamp),
            });
        }

        let mut series = self
            .series
            .write()
            .map_err(|_| Error::StoreUnavailable("series lock poisoned".to_string()))?;
        let entries = series.entry(key.clone()).or_default();

        if let Some(last) = entries.back() {
            if snapshot.timestamp < last.timestamp {
                return Err(Error::OutOfOrderSnapshot {
                    key: key.to_string(),
                    timestamp: snapshot.timestamp,
                    last: last.timestamp,
                });
            }
        }

        entries.push_back(snapshot);
        while entries.len() > self.retention {
            entries.pop_front();
        }
        trace!(series = %key, len = entries.len(), "recorded snapshot");
        Ok(())
    }

    /// Record many samples for one series, stopping at the first rejection.
    pub fn record_all<I>(&self, key: &SeriesKey, snapshots: I) -> Result<()>
    where
        I: IntoIterator<Item = Snapshot>,
    {
        for snapshot in snapshots {
            self.record(key, snapshot)?;
        }
        Ok(())
    }

    /// Drop samples older than `tick`. Returns how many were removed.
    pub fn prune_before(&self, tick: u64) -> Result<usize> {
        let mut series = self
            .series
            .write()
            .map_err(|_| Error::StoreUnavailable("series lock poisoned".to_string()))?;

        let mut removed = 0;
        for entries in series.values_mut() {
            while entries.front().is_some_and(|s| s.timestamp < tick) {
                entries.pop_front();
                removed += 1;
            }
        }
        series.retain(|_, entries| !entries.is_empty());
        Ok(removed)
    }

    /// Stop tracking a series (e.g. a colonist left the map).
    pub fn forget(&self, key: &SeriesKey) -> Result<bool> {
        let mut series = self
            .series
            .write()
            .map_err(|_| Error::StoreUnavailable("series lock poisoned".to_string()))?;
        Ok(series.remove(key).is_some())
    }

    /// Tracked series keys, sorted.
    pub fn keys(&self) -> Result<Vec<SeriesKey>> {
        let series = self
            .series
            .read()
            .map_err(|_| Error::StoreUnavailable("series lock poisoned".to_string()))?;
        let mut keys: Vec<SeriesKey> = series.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    pub fn len(&self, key: &SeriesKey) -> usize {
        self.series
            .read()
            .map(|series| series.get(key).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.series
            .read()
            .map(|series| series.is_empty())
            .unwrap_or(true)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn history(&self, key: &SeriesKey, max_samples: Option<usize>) -> Result<Vec<Snapshot>> {
        let series = self
            .series
            .read()
            .map_err(|_| Error::StoreUnavailable("series lock poisoned".to_string()))?;

        let Some(entries) = series.get(key) else {
            return Ok(Vec::new());
        };
        let take = max_samples.unwrap_or(entries.len()).min(entries.len());
        Ok(entries.iter().skip(entries.len() - take).copied().collect())
    }
}
