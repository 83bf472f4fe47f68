//! Raw history samples and time-unit conversion.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Simulation ticks in one in-game day.
pub const TICKS_PER_DAY: u64 = 60_000;

/// Simulation ticks in one in-game hour.
pub const TICKS_PER_HOUR: u64 = 2_500;

/// A single recorded sample of a tracked quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    /// Store-native timestamp (simulation ticks).
    pub timestamp: u64,
    /// Observed value.
    pub value: f64,
}

impl Snapshot {
    pub fn new(timestamp: u64, value: f64) -> Self {
        Snapshot { timestamp, value }
    }
}

/// Conversion between store ticks and a domain's reporting unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeBasis {
    /// Store ticks per reporting unit.
    pub ticks_per_unit: f64,
    /// Reporting unit name (e.g. "days").
    pub unit: String,
    /// Name of the finer unit used for horizons below one reporting unit.
    pub subunit: String,
    /// Sub-units per reporting unit.
    pub subunits_per_unit: f64,
}

impl Default for TimeBasis {
    fn default() -> Self {
        TimeBasis {
            ticks_per_unit: TICKS_PER_DAY as f64,
            unit: "days".to_string(),
            subunit: "hours".to_string(),
            subunits_per_unit: (TICKS_PER_DAY / TICKS_PER_HOUR) as f64,
        }
    }
}

impl TimeBasis {
    /// Convert a tick span into reporting units.
    pub fn ticks_to_units(&self, ticks: f64) -> f64 {
        ticks / self.ticks_per_unit
    }

    /// Convert reporting units into sub-units.
    pub fn units_to_subunits(&self, units: f64) -> f64 {
        units * self.subunits_per_unit
    }

    /// Whether both factors are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.ticks_per_unit.is_finite()
            && self.ticks_per_unit > 0.0
            && self.subunits_per_unit.is_finite()
            && self.subunits_per_unit > 0.0
    }
}

/// How much history the rate calculator looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "n", rename_all = "snake_case")]
pub enum Lookback {
    /// Every sample the store returned.
    #[default]
    All,
    /// The newest `n` samples.
    Samples(usize),
    /// Samples no older than `n` ticks before the newest sample.
    Ticks(u64),
}

impl Lookback {
    /// Slice `history` (oldest first) down to the window.
    pub fn apply<'a>(&self, history: &'a [Snapshot]) -> &'a [Snapshot] {
        match *self {
            Lookback::All => history,
            Lookback::Samples(n) => &history[history.len().saturating_sub(n)..],
            Lookback::Ticks(span) => match history.last() {
                Some(newest) => {
                    let cutoff = newest.timestamp.saturating_sub(span);
                    let start = history
                        .iter()
                        .position(|s| s.timestamp >= cutoff)
                        .unwrap_or(history.len());
                    &history[start..]
                }
                None => history,
            },
        }
    }

    /// Upper bound on samples worth fetching from the store.
    pub fn max_samples(&self) -> Option<usize> {
        match *self {
            Lookback::Samples(n) => Some(n),
            Lookback::All | Lookback::Ticks(_) => None,
        }
    }
}

/// Which extrapolation model a domain forecasts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Linear depletion toward zero (consumables).
    ZeroFloor,
    /// Linear approach toward a non-zero floor (break thresholds, reserves).
    FixedFloor,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::ZeroFloor => write!(f, "zero_floor"),
            ModelKind::FixedFloor => write!(f, "fixed_floor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_basis_is_days_and_hours() {
        let basis = TimeBasis::default();
        assert_eq!(basis.unit, "days");
        assert_eq!(basis.subunits_per_unit, 24.0);
        assert!((basis.ticks_to_units(90_000.0) - 1.5).abs() < 1e-12);
        assert!((basis.units_to_subunits(0.5) - 12.0).abs() < 1e-12);
        assert!(basis.is_valid());
    }

    fn samples(ticks: &[u64]) -> Vec<Snapshot> {
        ticks.iter().map(|&t| Snapshot::new(t, t as f64)).collect()
    }

    #[test]
    fn test_lookback_samples() {
        let history = samples(&[0, 10, 20, 30]);
        let window = Lookback::Samples(2).apply(&history);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].timestamp, 20);
        assert_eq!(Lookback::Samples(10).apply(&history).len(), 4);
    }

    #[test]
    fn test_lookback_ticks_anchored_at_newest() {
        let history = samples(&[0, 100, 200, 300]);
        let window = Lookback::Ticks(150).apply(&history);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].timestamp, 200);
        // Boundary sample is inside the window.
        assert_eq!(Lookback::Ticks(200).apply(&history)[0].timestamp, 100);
    }

    #[test]
    fn test_lookback_empty_history() {
        let history: Vec<Snapshot> = Vec::new();
        assert!(Lookback::Ticks(10).apply(&history).is_empty());
        assert!(Lookback::Samples(3).apply(&history).is_empty());
    }

    #[test]
    fn test_lookback_serde_shape() {
        let json = serde_json::to_string(&Lookback::Ticks(180_000)).unwrap();
        assert_eq!(json, r#"{"kind":"ticks","n":180000}"#);
        let all: Lookback = serde_json::from_str(r#"{"kind":"all"}"#).unwrap();
        assert_eq!(all, Lookback::All);
    }

    #[test]
    fn test_invalid_basis() {
        let basis = TimeBasis {
            ticks_per_unit: 0.0,
            ..TimeBasis::default()
        };
        assert!(!basis.is_valid());
    }
}
