//! Worst-status-wins aggregation over the global band precedence.

use cw_common::Band;
use cw_config::AggregationPolicy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One subsystem's classified band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SubsystemStatus {
    pub subsystem: String,
    pub band: Band,
}

impl SubsystemStatus {
    pub fn new(subsystem: impl Into<String>, band: Band) -> Self {
        SubsystemStatus {
            subsystem: subsystem.into(),
            band,
        }
    }
}

/// Colony-wide verdict and the subsystems responsible for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OverallStatus {
    pub band: Band,
    /// Subsystems at `band`, in input order.
    pub contributors: Vec<String>,
}

/// Walk [`Band::PRECEDENCE`] and stop at the first band anyone reported.
///
/// Empty input yields the least severe band with no contributors.
pub fn aggregate(statuses: &[SubsystemStatus], policy: AggregationPolicy) -> OverallStatus {
    for band in Band::PRECEDENCE {
        let mut at_band = statuses.iter().filter(|s| s.band == band);
        let contributors: Vec<String> = match policy {
            AggregationPolicy::AllContributors => at_band.map(|s| s.subsystem.clone()).collect(),
            AggregationPolicy::FirstOnly => at_band
                .next()
                .map(|s| vec![s.subsystem.clone()])
                .unwrap_or_default(),
        };
        if !contributors.is_empty() {
            return OverallStatus { band, contributors };
        }
    }

    OverallStatus {
        band: Band::least_severe(),
        contributors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(pairs: &[(&str, Band)]) -> Vec<SubsystemStatus> {
        pairs
            .iter()
            .map(|(name, band)| SubsystemStatus::new(*name, *band))
            .collect()
    }

    #[test]
    fn test_critical_wins() {
        let input = statuses(&[
            ("food", Band::Stable),
            ("power", Band::Critical),
            ("defense", Band::Warning),
        ]);
        let overall = aggregate(&input, AggregationPolicy::AllContributors);
        assert_eq!(overall.band, Band::Critical);
        assert_eq!(overall.contributors, vec!["power"]);
    }

    #[test]
    fn test_all_contributors_in_input_order() {
        let input = statuses(&[
            ("power", Band::Warning),
            ("food", Band::Healthy),
            ("defense", Band::Warning),
        ]);
        let overall = aggregate(&input, AggregationPolicy::AllContributors);
        assert_eq!(overall.band, Band::Warning);
        assert_eq!(overall.contributors, vec!["power", "defense"]);
    }

    #[test]
    fn test_first_only() {
        let input = statuses(&[("power", Band::Warning), ("defense", Band::Warning)]);
        let overall = aggregate(&input, AggregationPolicy::FirstOnly);
        assert_eq!(overall.contributors, vec!["power"]);
    }

    #[test]
    fn test_empty_is_healthy() {
        let overall = aggregate(&[], AggregationPolicy::AllContributors);
        assert_eq!(overall.band, Band::Healthy);
        assert!(overall.contributors.is_empty());
    }

    #[test]
    fn test_mixed_domains_use_one_order() {
        // Mood "high" outranks resource "warning".
        let input = statuses(&[("steel", Band::Warning), ("mood:Human1", Band::High)]);
        assert_eq!(
            aggregate(&input, AggregationPolicy::AllContributors).band,
            Band::High
        );
    }
}
