//! All adapters for one configuration, built once and reused per query.

use cw_common::{Result, SeriesKey};
use cw_config::{ForecastConfig, HealthConfig};
use tracing::{debug, info};

use crate::adapters::{MoodAdapter, MoodInput, MoodOverview, ResourceAdapter, ResourceReport};
use crate::health::{build_health_report, HealthReport, SubsystemFinding};
use crate::store::{FloorLookup, SnapshotStore};

#[derive(Debug, Clone)]
pub struct Engine {
    resources: Vec<ResourceAdapter>,
    mood: MoodAdapter,
    health: HealthConfig,
}

impl Engine {
    /// Build every adapter. Any bad cut table or basis fails here.
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        let resources = ResourceAdapter::from_configs(&config.resources, &config.time_basis)?;
        let mood = MoodAdapter::from_config(&config.mood, &config.time_basis)?;
        info!(
            resources = resources.len(),
            mood_domain = mood.domain(),
            "adapters ready"
        );
        Ok(Engine {
            resources,
            mood,
            health: config.health.clone(),
        })
    }

    pub fn resources(&self) -> &[ResourceAdapter] {
        &self.resources
    }

    pub fn mood(&self) -> &MoodAdapter {
        &self.mood
    }

    /// Forecast each configured resource that has a current reading.
    pub fn forecast_resources<F>(
        &self,
        store: &dyn SnapshotStore,
        current: F,
    ) -> Result<Vec<ResourceReport>>
    where
        F: Fn(&SeriesKey) -> Option<f64>,
    {
        let mut reports = Vec::with_capacity(self.resources.len());
        for adapter in &self.resources {
            let key = adapter.key();
            match current(&key) {
                Some(value) => reports.push(adapter.forecast(store, value)?),
                None => debug!(resource = adapter.name(), "no reading, skipped"),
            }
        }
        Ok(reports)
    }

    /// Assess every colonist. The first host failure aborts the batch.
    pub fn assess_mood(
        &self,
        store: &dyn SnapshotStore,
        floors: &dyn FloorLookup,
        inputs: &[MoodInput<'_>],
    ) -> Result<MoodOverview> {
        let reports = inputs
            .iter()
            .map(|input| self.mood.assess(store, floors, *input))
            .collect::<Result<Vec<_>>>()?;
        Ok(MoodOverview::new(reports))
    }

    /// Merge forecasts and host findings into one report.
    ///
    /// Order: resources, host subsystems, then colonists.
    pub fn health(
        &self,
        resources: &[ResourceReport],
        host: Vec<SubsystemFinding>,
        mood: &MoodOverview,
    ) -> HealthReport {
        let mut findings: Vec<SubsystemFinding> =
            resources.iter().map(ResourceReport::to_finding).collect();
        findings.extend(host);
        findings.extend(
            mood.colonists
                .iter()
                .map(|report| report.to_finding(self.mood.domain())),
        );
        build_health_report(findings, &self.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySnapshotStore;
    use cw_common::{Band, Snapshot, TICKS_PER_DAY};
    use std::collections::HashMap;

    fn engine() -> Engine {
        Engine::from_config(&ForecastConfig::default()).unwrap()
    }

    #[test]
    fn test_skips_resources_without_reading() {
        let store = MemorySnapshotStore::default();
        let reports = engine()
            .forecast_resources(&store, |key| (key.as_str() == "food").then_some(50.0))
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].resource, "food");
    }

    #[test]
    fn test_health_combines_all_sources() {
        let store = MemorySnapshotStore::default();
        let food = SeriesKey::domain("food");
        store.record(&food, Snapshot::new(0, 30.0)).unwrap();
        store.record(&food, Snapshot::new(TICKS_PER_DAY, 20.0)).unwrap();

        let engine = engine();
        let resources = engine
            .forecast_resources(&store, |key| (key == &food).then_some(20.0))
            .unwrap();

        let mut floors: HashMap<String, f64> = HashMap::new();
        floors.insert("Human1".to_string(), 0.2);
        let mood = engine
            .assess_mood(
                &store,
                &floors,
                &[MoodInput {
                    colonist_id: "Human1",
                    current: 0.8,
                    negative_thoughts: 0.0,
                    now: TICKS_PER_DAY,
                }],
            )
            .unwrap();

        let host = vec![SubsystemFinding::new("power", Band::Warning)];
        let report = engine.health(&resources, host, &mood);
        let names: Vec<&str> = report.systems.iter().map(|s| s.subsystem.as_str()).collect();
        assert_eq!(names, vec!["food", "power", "mood:Human1"]);
        assert_eq!(report.overall.band, Band::Critical);
        assert_eq!(report.overall.contributors, vec!["food"]);
    }

    #[test]
    fn test_missing_floor_aborts_mood_batch() {
        let store = MemorySnapshotStore::default();
        let err = engine()
            .assess_mood(
                &store,
                &HashMap::<String, f64>::new(),
                &[MoodInput {
                    colonist_id: "Gone",
                    current: 0.5,
                    negative_thoughts: 0.0,
                    now: 0,
                }],
            )
            .unwrap_err();
        assert!(matches!(err, cw_common::Error::EntityNotFound { .. }));
    }
}
