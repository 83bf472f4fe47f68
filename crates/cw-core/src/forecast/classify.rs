//! First-match threshold classification.
//!
//! A [`CutTable`] is validated once when built. After that, `classify` is
//! total: every input maps to a band, with boundaries inclusive to the more
//! severe side.

use cw_common::{Band, Comparison, CutEntry, Error, ModelKind, Result};
use std::collections::HashSet;

/// Validated, ordered cut table.
#[derive(Debug, Clone, PartialEq)]
pub struct CutTable {
    entries: Vec<CutEntry>,
    default_band: Band,
}

impl CutTable {
    /// Validate `entries` for `domain` and build the table.
    ///
    /// Rules:
    /// - every boundary is finite
    /// - rows are listed most severe first, each band at most once
    /// - boundaries do not decrease down the table within one comparison kind
    /// - `default_band` is less severe than every row
    /// - distance rows require the fixed-floor model
    pub fn new(
        domain: &str,
        entries: Vec<CutEntry>,
        default_band: Band,
        model: ModelKind,
    ) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidCutTable {
            domain: domain.to_string(),
            reason,
        };

        let mut seen = HashSet::new();
        for (idx, entry) in entries.iter().enumerate() {
            if !entry.boundary.is_finite() {
                return Err(invalid(format!(
                    "row {} ({}) has non-finite boundary",
                    idx, entry.band
                )));
            }
            if !seen.insert(entry.band) {
                return Err(invalid(format!("band {} appears more than once", entry.band)));
            }
            if !entry.band.is_worse_than(default_band) {
                return Err(invalid(format!(
                    "row {} ({}) is not more severe than the default band {}",
                    idx, entry.band, default_band
                )));
            }
            if entry.comparison == Comparison::Distance && model != ModelKind::FixedFloor {
                return Err(Error::ModelMismatch {
                    domain: domain.to_string(),
                    reason: format!(
                        "row {} ({}) compares distance to floor under the {} model",
                        idx, entry.band, model
                    ),
                });
            }
        }

        for pair in entries.windows(2) {
            if !pair[0].band.is_worse_than(pair[1].band) {
                return Err(invalid(format!(
                    "{} is listed before the more severe {}",
                    pair[0].band, pair[1].band
                )));
            }
        }

        for kind in [Comparison::Value, Comparison::Distance] {
            let mut previous: Option<&CutEntry> = None;
            for entry in entries.iter().filter(|e| e.comparison == kind) {
                if let Some(prev) = previous {
                    if entry.boundary < prev.boundary {
                        return Err(invalid(format!(
                            "{} boundary {} is below the more severe {} boundary {}",
                            entry.band, entry.boundary, prev.band, prev.boundary
                        )));
                    }
                }
                previous = Some(entry);
            }
        }

        Ok(CutTable {
            entries,
            default_band,
        })
    }

    /// Classify `value`; distance rows compare `value - floor`.
    ///
    /// NaN matches no row and lands on the default band.
    pub fn classify(&self, value: f64, floor: f64) -> Band {
        self.entries
            .iter()
            .find(|entry| {
                let measured = match entry.comparison {
                    Comparison::Value => value,
                    Comparison::Distance => value - floor,
                };
                measured <= entry.boundary
            })
            .map_or(self.default_band, |entry| entry.band)
    }

    pub fn default_band(&self) -> Band {
        self.default_band
    }

    pub fn entries(&self) -> &[CutEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_table() -> CutTable {
        CutTable::new(
            "food",
            vec![
                CutEntry::value(Band::Critical, 3.0),
                CutEntry::value(Band::Warning, 7.0),
                CutEntry::value(Band::Low, 14.0),
            ],
            Band::Stable,
            ModelKind::ZeroFloor,
        )
        .unwrap()
    }

    fn mood_table() -> CutTable {
        CutTable::new(
            "mood",
            vec![
                CutEntry::distance(Band::Critical, 0.0),
                CutEntry::distance(Band::High, 0.05),
                CutEntry::distance(Band::Medium, 0.10),
                CutEntry::value(Band::Low, 0.35),
            ],
            Band::Healthy,
            ModelKind::FixedFloor,
        )
        .unwrap()
    }

    #[test]
    fn test_boundary_is_inclusive_to_more_severe() {
        let table = resource_table();
        assert_eq!(table.classify(3.0, 0.0), Band::Critical);
        assert_eq!(table.classify(3.0 + 1e-9, 0.0), Band::Warning);
        assert_eq!(table.classify(7.0, 0.0), Band::Warning);
        assert_eq!(table.classify(14.0, 0.0), Band::Low);
        assert_eq!(table.classify(14.5, 0.0), Band::Stable);
    }

    #[test]
    fn test_distance_rows_use_floor() {
        let table = mood_table();
        assert_eq!(table.classify(0.20, 0.20), Band::Critical);
        assert_eq!(table.classify(0.24, 0.20), Band::High);
        assert_eq!(table.classify(0.29, 0.20), Band::Medium);
        assert_eq!(table.classify(0.34, 0.20), Band::Low);
        assert_eq!(table.classify(0.40, 0.20), Band::Healthy);
    }

    #[test]
    fn test_nan_lands_on_default() {
        assert_eq!(resource_table().classify(f64::NAN, 0.0), Band::Stable);
    }

    #[test]
    fn test_empty_table_always_default() {
        let table = CutTable::new("x", vec![], Band::Stable, ModelKind::ZeroFloor).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.classify(-100.0, 0.0), Band::Stable);
    }

    #[test]
    fn test_rejects_decreasing_boundaries() {
        let err = CutTable::new(
            "food",
            vec![
                CutEntry::value(Band::Critical, 7.0),
                CutEntry::value(Band::Warning, 3.0),
            ],
            Band::Stable,
            ModelKind::ZeroFloor,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCutTable { .. }));
    }

    #[test]
    fn test_monotonic_check_is_per_comparison_kind() {
        // 0.35 value row after 0.10 distance row is fine: different axes.
        assert!(!mood_table().is_empty());

        let err = CutTable::new(
            "mood",
            vec![
                CutEntry::distance(Band::Critical, 0.05),
                CutEntry::value(Band::High, 0.9),
                CutEntry::distance(Band::Medium, 0.0),
            ],
            Band::Healthy,
            ModelKind::FixedFloor,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCutTable { .. }));
    }

    #[test]
    fn test_rejects_out_of_severity_order() {
        let err = CutTable::new(
            "food",
            vec![
                CutEntry::value(Band::Warning, 3.0),
                CutEntry::value(Band::Critical, 7.0),
            ],
            Band::Stable,
            ModelKind::ZeroFloor,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCutTable { .. }));
    }

    #[test]
    fn test_rejects_repeated_band() {
        let err = CutTable::new(
            "food",
            vec![
                CutEntry::value(Band::Critical, 1.0),
                CutEntry::value(Band::Critical, 2.0),
            ],
            Band::Stable,
            ModelKind::ZeroFloor,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_default_more_severe_than_rows() {
        let err = CutTable::new(
            "food",
            vec![CutEntry::value(Band::Low, 1.0)],
            Band::Warning,
            ModelKind::ZeroFloor,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCutTable { .. }));
    }

    #[test]
    fn test_rejects_non_finite_boundary() {
        let err = CutTable::new(
            "food",
            vec![CutEntry::value(Band::Critical, f64::INFINITY)],
            Band::Stable,
            ModelKind::ZeroFloor,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCutTable { .. }));
    }

    #[test]
    fn test_distance_under_zero_floor_is_model_mismatch() {
        let err = CutTable::new(
            "food",
            vec![CutEntry::distance(Band::Critical, 0.0)],
            Band::Stable,
            ModelKind::ZeroFloor,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ModelMismatch { .. }));
    }
}
