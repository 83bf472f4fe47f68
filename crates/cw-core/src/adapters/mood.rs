//! Colonist mood against each colonist's extreme break threshold.
//!
//! Mood is a fixed-floor domain: the floor is read from the host on every
//! call, and both rising and falling rates are kept so the trend can be
//! reported. When history is too short the rate falls back to an estimate
//! from the colonist's active negative thoughts.
//!
//! When the host also reports the major and minor break thresholds, the
//! `high` and `medium` distance rows are moved to those thresholds for that
//! call; the configured distances are used otherwise.

use cw_common::{Band, Comparison, CutEntry, ModelKind, Result, SeriesKey, Snapshot, TimeBasis};
use cw_config::MoodConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Assessment, DomainModel, DomainSettings};
use crate::forecast::{CutTable, SignPolicy};
use crate::health::SubsystemFinding;
use crate::store::{BreakThresholds, FloorLookup, SnapshotStore};

/// One historical point, relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecentSample {
    /// Age of the sample in sub-units (hours by default).
    pub ago: f64,
    pub value: f64,
}

/// Mood forecast for one colonist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoodReport {
    pub colonist_id: String,
    /// Extreme break threshold at the time of the call.
    pub floor: f64,
    /// `current - floor`.
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_threshold: Option<f64>,
    #[serde(flatten)]
    pub assessment: Assessment,
    pub data_points: usize,
    pub recent: Vec<RecentSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl MoodReport {
    pub fn band(&self) -> Band {
        self.assessment.band
    }

    pub fn to_finding(&self, domain: &str) -> SubsystemFinding {
        SubsystemFinding {
            subsystem: SeriesKey::entity(domain, &self.colonist_id).to_string(),
            band: self.band(),
            issues: self
                .issue
                .iter()
                .map(|issue| format!("{}: {}", self.colonist_id, issue))
                .collect(),
            recommendations: self.recommendation.iter().cloned().collect(),
        }
    }
}

/// Colonist flagged in the mood overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighRiskColonist {
    pub colonist_id: String,
    pub band: Band,
    pub horizon: String,
}

/// Mood reports for a set of colonists plus the ones at high risk or worse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoodOverview {
    pub colonists: Vec<MoodReport>,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub high_risk: Vec<HighRiskColonist>,
}

impl MoodOverview {
    pub fn new(colonists: Vec<MoodReport>) -> Self {
        let high_risk = colonists
            .iter()
            .filter(|r| r.band() >= Band::High)
            .map(|r| HighRiskColonist {
                colonist_id: r.colonist_id.clone(),
                band: r.band(),
                horizon: r.assessment.forecast.horizon.describe(),
            })
            .collect();
        MoodOverview {
            total: colonists.len(),
            colonists,
            high_risk,
        }
    }
}

/// Live inputs for one colonist that are not in the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodInput<'a> {
    pub colonist_id: &'a str,
    pub current: f64,
    /// Sum of active negative thought offsets (sign ignored).
    pub negative_thoughts: f64,
    /// Current store timestamp, for sample ages.
    pub now: u64,
}

#[derive(Debug, Clone)]
pub struct MoodAdapter {
    domain: String,
    fallback_rate: f64,
    thought_divisor: f64,
    min_thought_rate: f64,
    recent_samples: usize,
    model: DomainModel,
}

impl MoodAdapter {
    pub fn from_config(config: &MoodConfig, basis: &TimeBasis) -> Result<Self> {
        if !(config.thought_fallback_divisor.is_finite() && config.thought_fallback_divisor > 0.0)
        {
            return Err(cw_common::Error::Config(format!(
                "{}: thought_fallback_divisor must be positive",
                config.domain
            )));
        }
        let model = DomainModel::build(DomainSettings {
            domain: &config.domain,
            model: ModelKind::FixedFloor,
            basis,
            lookback: config.lookback,
            fallback_rate: config.fallback_rate,
            sign_policy: SignPolicy::Preserve,
            require_measured: config.require_measured,
            min_rate: config.min_rate,
            stable_epsilon: config.stable_epsilon,
            level_cuts: &config.level_cuts,
            horizon_cuts: &config.horizon_cuts,
            default_band: Band::Healthy,
            advice: &config.advice,
        })?;

        Ok(MoodAdapter {
            domain: config.domain.clone(),
            fallback_rate: config.fallback_rate,
            thought_divisor: config.thought_fallback_divisor,
            min_thought_rate: config.min_thought_rate.abs(),
            recent_samples: config.recent_samples,
            model,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn key(&self, colonist_id: &str) -> SeriesKey {
        SeriesKey::entity(&self.domain, colonist_id)
    }

    /// Fallback rate per reporting unit for a colonist with no usable history.
    pub fn thought_fallback(&self, negative_thoughts: f64) -> f64 {
        let estimate = negative_thoughts.abs() / self.thought_divisor;
        if estimate.is_finite() && estimate > self.min_thought_rate {
            -estimate
        } else {
            self.fallback_rate
        }
    }

    /// Assess one colonist. The thresholds are looked up fresh on every call.
    pub fn assess(
        &self,
        store: &dyn SnapshotStore,
        floors: &dyn FloorLookup,
        input: MoodInput<'_>,
    ) -> Result<MoodReport> {
        let thresholds = floors.break_thresholds(input.colonist_id)?;
        let history = store.history(
            &self.key(input.colonist_id),
            self.model.lookback().max_samples(),
        )?;
        self.assess_series_with(&history, thresholds, input)
    }

    /// Assess from an explicit history slice and extreme threshold only.
    pub fn assess_series(
        &self,
        history: &[Snapshot],
        floor: f64,
        input: MoodInput<'_>,
    ) -> Result<MoodReport> {
        self.assess_series_with(history, BreakThresholds::extreme_only(floor), input)
    }

    /// Level table for one colonist's thresholds, or `None` when the
    /// configured table applies unchanged.
    ///
    /// Only distance rows for `high` (major) and `medium` (minor) move. A
    /// threshold below a more severe boundary is raised to it, so a host
    /// reporting inverted thresholds still yields an ordered table.
    pub fn level_for(&self, thresholds: BreakThresholds) -> Option<CutTable> {
        let extreme = thresholds.extreme;
        let gap = |threshold: Option<f64>| {
            threshold
                .map(|t| t - extreme)
                .filter(|distance| distance.is_finite())
        };
        let major = gap(thresholds.major);
        let minor = gap(thresholds.minor);
        if major.is_none() && minor.is_none() {
            return None;
        }

        let configured = self.model.level_table();
        let mut previous = f64::NEG_INFINITY;
        let entries: Vec<CutEntry> = configured
            .entries()
            .iter()
            .map(|entry| {
                if entry.comparison != Comparison::Distance {
                    return *entry;
                }
                let moved = match entry.band {
                    Band::High => major,
                    Band::Medium => minor,
                    _ => None,
                };
                let boundary = moved.unwrap_or(entry.boundary).max(previous);
                previous = boundary;
                CutEntry::distance(entry.band, boundary)
            })
            .collect();

        match CutTable::new(
            &self.domain,
            entries,
            configured.default_band(),
            ModelKind::FixedFloor,
        ) {
            Ok(table) => Some(table),
            Err(err) => {
                debug!(error = %err, "break thresholds rejected, using configured cuts");
                None
            }
        }
    }

    /// Assess from an explicit history slice and the colonist's thresholds.
    pub fn assess_series_with(
        &self,
        history: &[Snapshot],
        thresholds: BreakThresholds,
        input: MoodInput<'_>,
    ) -> Result<MoodReport> {
        let floor = thresholds.extreme;
        let fallback = self.thought_fallback(input.negative_thoughts);
        let assessment = match self.level_for(thresholds) {
            Some(level) => self.model.assess_with_level(
                history,
                input.current,
                floor,
                Some(fallback),
                &level,
            )?,
            None => self
                .model
                .assess(history, input.current, floor, Some(fallback))?,
        };
        let advice = self.model.advice_for(assessment.band);

        let window = self.model.lookback().apply(history);
        let ticks_per_subunit =
            self.model.basis().ticks_per_unit / self.model.basis().subunits_per_unit;
        let recent = window[window.len().saturating_sub(self.recent_samples)..]
            .iter()
            .map(|s| RecentSample {
                ago: input.now.saturating_sub(s.timestamp) as f64 / ticks_per_subunit,
                value: s.value,
            })
            .collect();

        let note = if assessment.rate.is_measured() {
            None
        } else {
            debug!(colonist = input.colonist_id, fallback, "mood rate from thoughts");
            Some("Collecting data: trend needs at least two samples a few hours apart".to_string())
        };

        Ok(MoodReport {
            colonist_id: input.colonist_id.to_string(),
            floor,
            distance: input.current - floor,
            major_threshold: thresholds.major,
            minor_threshold: thresholds.minor,
            data_points: window.len(),
            recent,
            issue: advice.map(|a| a.issue.clone()),
            recommendation: advice.map(|a| a.recommendation.clone()),
            note,
            assessment,
        })
    }
}
