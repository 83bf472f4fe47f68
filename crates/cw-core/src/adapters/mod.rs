//! Domain adapters.
//!
//! An adapter is configuration turned into validated engine parts: a rate
//! calculator, a forecaster, and two cut tables. All domain knowledge lives
//! in the config values; the shared [`DomainModel`] runs the same pipeline
//! for every domain.

pub mod mood;
pub mod resource;

pub use mood::{HighRiskColonist, MoodAdapter, MoodInput, MoodOverview, MoodReport, RecentSample};
pub use resource::{ResourceAdapter, ResourceReport};

use cw_common::{Band, CutEntry, Error, Lookback, ModelKind, Result, Snapshot, TimeBasis};
use cw_config::Advice;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::forecast::{
    CutTable, EventForecaster, Forecast, Horizon, RateCalculator, RateEstimate, SignPolicy, Trend,
};

/// Everything the pipeline derived for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Assessment {
    pub current: f64,
    pub rate: RateEstimate,
    pub trend: Trend,
    pub forecast: Forecast,
    /// Band from the current value (or distance to floor).
    pub level_band: Band,
    /// Band from the numeric horizon, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_band: Option<Band>,
    /// The more severe of the two; `critical` once the threshold is crossed.
    pub band: Band,
}

/// Settings shared by every domain, before validation.
pub(crate) struct DomainSettings<'a> {
    pub domain: &'a str,
    pub model: ModelKind,
    pub basis: &'a TimeBasis,
    pub lookback: Lookback,
    pub fallback_rate: f64,
    pub sign_policy: SignPolicy,
    pub require_measured: bool,
    pub min_rate: f64,
    pub stable_epsilon: f64,
    pub level_cuts: &'a [CutEntry],
    pub horizon_cuts: &'a [CutEntry],
    pub default_band: Band,
    pub advice: &'a BTreeMap<Band, Advice>,
}

/// Validated pipeline for one domain.
#[derive(Debug, Clone)]
pub struct DomainModel {
    domain: String,
    rate: RateCalculator,
    forecaster: EventForecaster,
    level: CutTable,
    horizon: CutTable,
    stable_epsilon: f64,
    advice: BTreeMap<Band, Advice>,
}

impl DomainModel {
    pub(crate) fn build(settings: DomainSettings<'_>) -> Result<Self> {
        if !settings.basis.is_valid() {
            return Err(Error::Config(format!(
                "{}: time basis must have positive, finite factors",
                settings.domain
            )));
        }
        for (field, value) in [
            ("fallback_rate", settings.fallback_rate),
            ("min_rate", settings.min_rate),
            ("stable_epsilon", settings.stable_epsilon),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!(
                    "{}: {} must be finite",
                    settings.domain, field
                )));
            }
        }

        let level = CutTable::new(
            settings.domain,
            settings.level_cuts.to_vec(),
            settings.default_band,
            settings.model,
        )?;
        // Horizons are plain durations; distance rows make no sense there.
        let horizon = CutTable::new(
            settings.domain,
            settings.horizon_cuts.to_vec(),
            settings.default_band,
            ModelKind::ZeroFloor,
        )?;

        Ok(DomainModel {
            domain: settings.domain.to_string(),
            rate: RateCalculator::new(settings.lookback, settings.basis, settings.fallback_rate)
                .with_sign_policy(settings.sign_policy),
            forecaster: EventForecaster::new(settings.model, settings.basis.clone())
                .require_measured(settings.require_measured)
                .min_rate(settings.min_rate.abs()),
            level,
            horizon,
            stable_epsilon: settings.stable_epsilon.abs(),
            advice: settings.advice.clone(),
        })
    }

    /// Run rate, classification, and forecast for one series.
    pub fn assess(
        &self,
        history: &[Snapshot],
        current: f64,
        floor: f64,
        fallback: Option<f64>,
    ) -> Result<Assessment> {
        self.assess_with_level(history, current, floor, fallback, &self.level)
    }

    /// Same as [`assess`](Self::assess), classifying the level against
    /// `level` instead of the configured table.
    pub fn assess_with_level(
        &self,
        history: &[Snapshot],
        current: f64,
        floor: f64,
        fallback: Option<f64>,
        level: &CutTable,
    ) -> Result<Assessment> {
        let rate = match fallback {
            Some(value) => self.rate.estimate_with_fallback(history, value),
            None => self.rate.estimate(history),
        };
        let forecast = self.forecaster.forecast(current, &rate, floor)?;

        let level_band = level.classify(current, floor);
        let horizon_band = forecast
            .units_remaining
            .map(|units| self.horizon.classify(units, 0.0));
        let band = if forecast.horizon == Horizon::Imminent {
            Band::Critical
        } else {
            horizon_band.map_or(level_band, |h| h.max(level_band))
        };

        debug!(
            domain = %self.domain,
            current,
            rate = rate.value,
            basis = ?rate.basis,
            horizon = %forecast.horizon.describe(),
            %band,
            "assessed series"
        );

        Ok(Assessment {
            current,
            trend: Trend::from_rate(rate.value, self.stable_epsilon),
            rate,
            forecast,
            level_band,
            horizon_band,
            band,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn level_table(&self) -> &CutTable {
        &self.level
    }

    pub fn lookback(&self) -> Lookback {
        self.rate.lookback
    }

    pub fn model(&self) -> ModelKind {
        self.forecaster.model
    }

    pub fn basis(&self) -> &TimeBasis {
        &self.forecaster.basis
    }

    pub fn advice_for(&self, band: Band) -> Option<&Advice> {
        self.advice.get(&band)
    }
}
