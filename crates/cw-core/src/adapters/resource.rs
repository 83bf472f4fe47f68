//! Consumable stockpiles (food, medicine, wood, steel).

use cw_common::{Band, ModelKind, Result, SeriesKey, TimeBasis};
use cw_config::ResourceConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Assessment, DomainModel, DomainSettings};
use crate::forecast::SignPolicy;
use crate::health::SubsystemFinding;
use crate::store::SnapshotStore;

/// Forecast for one stockpile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceReport {
    pub resource: String,
    pub label: String,
    pub model: ModelKind,
    /// Reserve level the forecast targets (0 for zero-floor).
    pub floor: f64,
    #[serde(flatten)]
    pub assessment: Assessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl ResourceReport {
    pub fn band(&self) -> Band {
        self.assessment.band
    }

    /// Convert into a health finding, one issue and recommendation at most.
    pub fn to_finding(&self) -> SubsystemFinding {
        let issues = self
            .issue
            .iter()
            .map(|issue| format!("{} ({})", issue, self.detail()))
            .collect();
        SubsystemFinding {
            subsystem: self.resource.clone(),
            band: self.band(),
            issues,
            recommendations: self.recommendation.iter().cloned().collect(),
        }
    }

    fn detail(&self) -> String {
        format!(
            "{:.0} left, {}",
            self.assessment.current,
            self.assessment.forecast.horizon.describe()
        )
    }
}

/// Adapter for one configured stockpile.
#[derive(Debug, Clone)]
pub struct ResourceAdapter {
    name: String,
    label: String,
    floor: f64,
    model: DomainModel,
}

impl ResourceAdapter {
    /// Validate the config and build the adapter.
    pub fn from_config(config: &ResourceConfig, basis: &TimeBasis) -> Result<Self> {
        let floor = match config.model {
            ModelKind::ZeroFloor => 0.0,
            ModelKind::FixedFloor => config.floor,
        };
        let model = DomainModel::build(DomainSettings {
            domain: &config.name,
            model: config.model,
            basis,
            lookback: config.lookback,
            fallback_rate: config.fallback_rate,
            sign_policy: SignPolicy::DepletionOnly,
            require_measured: config.require_measured,
            min_rate: config.min_rate,
            stable_epsilon: config.stable_epsilon,
            level_cuts: &config.level_cuts,
            horizon_cuts: &config.horizon_cuts,
            default_band: Band::Stable,
            advice: &config.advice,
        })?;
        if !floor.is_finite() {
            return Err(cw_common::Error::Config(format!(
                "{}: floor must be finite",
                config.name
            )));
        }

        Ok(ResourceAdapter {
            name: config.name.clone(),
            label: config.display_label().to_string(),
            floor,
            model,
        })
    }

    /// Build every resource adapter in a config, failing on the first bad one.
    pub fn from_configs(configs: &[ResourceConfig], basis: &TimeBasis) -> Result<Vec<Self>> {
        configs
            .iter()
            .map(|config| Self::from_config(config, basis))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> SeriesKey {
        SeriesKey::domain(&self.name)
    }

    /// Forecast from the store's history for this resource.
    pub fn forecast(&self, store: &dyn SnapshotStore, current: f64) -> Result<ResourceReport> {
        let history = store.history(&self.key(), self.model.lookback().max_samples())?;
        self.forecast_series(&history, current)
    }

    /// Forecast from an explicit history slice (oldest first).
    pub fn forecast_series(
        &self,
        history: &[cw_common::Snapshot],
        current: f64,
    ) -> Result<ResourceReport> {
        let assessment = self.model.assess(history, current, self.floor, None)?;
        let advice = self.model.advice_for(assessment.band);

        Ok(ResourceReport {
            resource: self.name.clone(),
            label: self.label.clone(),
            model: self.model.model(),
            floor: self.floor,
            issue: advice.map(|a| a.issue.clone()),
            recommendation: advice.map(|a| a.recommendation.clone()),
            assessment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{Confidence, Horizon, RateBasis};
    use crate::store::MemorySnapshotStore;
    use cw_common::{CutEntry, Snapshot, TICKS_PER_DAY};
    use cw_config::ForecastConfig;

    fn food() -> ResourceAdapter {
        let config = ForecastConfig::default();
        ResourceAdapter::from_config(config.resource("food").unwrap(), &config.time_basis)
            .unwrap()
    }

    #[test]
    fn test_default_resources_build() {
        let config = ForecastConfig::default();
        let adapters = ResourceAdapter::from_configs(&config.resources, &config.time_basis).unwrap();
        assert_eq!(adapters.len(), 4);
        assert_eq!(adapters[0].key().as_str(), "food");
    }

    #[test]
    fn test_two_days_of_food_is_critical() {
        let store = MemorySnapshotStore::new(10);
        let key = SeriesKey::domain("food");
        store.record(&key, Snapshot::new(0, 30.0)).unwrap();
        store.record(&key, Snapshot::new(TICKS_PER_DAY, 20.0)).unwrap();

        let report = food().forecast(&store, 20.0).unwrap();
        assert_eq!(report.band(), Band::Critical);
        assert_eq!(report.assessment.forecast.confidence, Confidence::Measured);
        assert!((report.assessment.forecast.units_remaining.unwrap() - 2.0).abs() < 1e-9);
        assert!(report.recommendation.as_deref().unwrap().starts_with("URGENT"));
    }

    #[test]
    fn test_single_snapshot_is_insufficient_and_banded_by_level() {
        let store = MemorySnapshotStore::new(10);
        store
            .record(&SeriesKey::domain("food"), Snapshot::new(0, 50.0))
            .unwrap();

        let report = food().forecast(&store, 50.0).unwrap();
        assert_eq!(report.assessment.forecast.horizon, Horizon::InsufficientData);
        assert_eq!(report.assessment.rate.basis, RateBasis::FallbackDefault);
        assert_eq!(report.assessment.horizon_band, None);
        assert_eq!(report.band(), report.assessment.level_band);
    }

    #[test]
    fn test_growing_stock_is_not_approaching() {
        let history = [Snapshot::new(0, 10.0), Snapshot::new(TICKS_PER_DAY, 80.0)];
        let report = food().forecast_series(&history, 80.0).unwrap();
        assert_eq!(report.assessment.rate.value, 0.0);
        assert_eq!(report.assessment.forecast.horizon, Horizon::NotApproaching);
        assert_eq!(report.band(), Band::Stable);
        assert!(report.issue.is_none());
    }

    #[test]
    fn test_fixed_floor_reserve() {
        let mut config = ResourceConfig::new(
            "steel",
            "Steel",
            vec![CutEntry::distance(Band::Critical, 0.0)],
        );
        config.model = ModelKind::FixedFloor;
        config.floor = 100.0;
        let adapter = ResourceAdapter::from_config(&config, &TimeBasis::default()).unwrap();

        let history = [Snapshot::new(0, 300.0), Snapshot::new(TICKS_PER_DAY, 250.0)];
        let report = adapter.forecast_series(&history, 250.0).unwrap();
        // (250 - 100) / 50 per day
        assert!((report.assessment.forecast.units_remaining.unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(report.floor, 100.0);
    }

    #[test]
    fn test_distance_cut_on_zero_floor_fails_construction() {
        let config = ResourceConfig::new(
            "food",
            "Food",
            vec![CutEntry::distance(Band::Critical, 0.0)],
        );
        let err = ResourceAdapter::from_config(&config, &TimeBasis::default()).unwrap_err();
        assert!(matches!(err, cw_common::Error::ModelMismatch { .. }));
    }

    #[test]
    fn test_to_finding_carries_advice() {
        let history = [Snapshot::new(0, 30.0), Snapshot::new(TICKS_PER_DAY, 20.0)];
        let finding = food().forecast_series(&history, 20.0).unwrap().to_finding();
        assert_eq!(finding.subsystem, "food");
        assert_eq!(finding.band, Band::Critical);
        assert_eq!(finding.issues.len(), 1);
        assert!(finding.issues[0].contains("2.0 days"));
        assert_eq!(finding.recommendations.len(), 1);
    }
}
