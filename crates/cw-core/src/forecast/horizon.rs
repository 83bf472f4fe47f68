//! Time-to-threshold forecasting.
//!
//! Linear extrapolation of the current value toward a target: zero for
//! consumables, a fixed floor otherwise. Checks run in a fixed order:
//! imminent, insufficient data, not approaching, then the numeric horizon.

use cw_common::{Error, ModelKind, Result, TimeBasis};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate::RateEstimate;

/// Forecast time remaining until the threshold is crossed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Horizon {
    /// Numeric horizon in `unit`.
    Finite { value: f64, unit: String },
    /// Only the fallback rate is available and the domain needs measured data.
    InsufficientData,
    /// The value is not moving toward the threshold.
    NotApproaching,
    /// The threshold is already crossed.
    Imminent,
}

impl Horizon {
    pub fn is_finite(&self) -> bool {
        matches!(self, Horizon::Finite { .. })
    }

    /// Short human rendering, e.g. "2.0 days" or "insufficient data".
    pub fn describe(&self) -> String {
        match self {
            Horizon::Finite { value, unit } => format!("{:.1} {}", value, unit),
            Horizon::InsufficientData => "insufficient data".to_string(),
            Horizon::NotApproaching => "not approaching".to_string(),
            Horizon::Imminent => "imminent".to_string(),
        }
    }
}

/// Whether the horizon rests on measured history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Measured,
    Estimated,
}

/// Forecaster output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Forecast {
    pub horizon: Horizon,
    pub confidence: Confidence,
    /// Numeric horizon in reporting units, before any sub-unit conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_remaining: Option<f64>,
}

impl Forecast {
    fn sentinel(horizon: Horizon, confidence: Confidence) -> Self {
        Forecast {
            horizon,
            confidence,
            units_remaining: None,
        }
    }
}

/// Per-domain forecaster settings.
#[derive(Debug, Clone)]
pub struct EventForecaster {
    pub model: ModelKind,
    /// Refuse numeric horizons built on the fallback rate.
    pub require_measured: bool,
    /// Depletion slower than this is treated as not approaching.
    pub min_rate: f64,
    pub basis: TimeBasis,
}

impl EventForecaster {
    pub fn new(model: ModelKind, basis: TimeBasis) -> Self {
        EventForecaster {
            model,
            require_measured: false,
            min_rate: 0.0,
            basis,
        }
    }

    pub fn require_measured(mut self, required: bool) -> Self {
        self.require_measured = required;
        self
    }

    pub fn min_rate(mut self, min_rate: f64) -> Self {
        self.min_rate = min_rate;
        self
    }

    /// Forecast when `current` reaches the threshold.
    ///
    /// `floor` is the threshold under the fixed-floor model and is ignored
    /// under zero-floor. Errors only on non-finite inputs.
    pub fn forecast(&self, current: f64, rate: &RateEstimate, floor: f64) -> Result<Forecast> {
        if !current.is_finite() {
            return Err(Error::NonFiniteValue {
                field: "current".to_string(),
            });
        }
        let target = match self.model {
            ModelKind::ZeroFloor => 0.0,
            ModelKind::FixedFloor => floor,
        };
        if !target.is_finite() {
            return Err(Error::NonFiniteValue {
                field: "floor".to_string(),
            });
        }

        let confidence = if rate.is_measured() {
            Confidence::Measured
        } else {
            Confidence::Estimated
        };

        if current <= target {
            return Ok(Forecast::sentinel(Horizon::Imminent, Confidence::Measured));
        }

        if !rate.is_measured() && self.require_measured {
            return Ok(Forecast::sentinel(
                Horizon::InsufficientData,
                Confidence::Estimated,
            ));
        }

        // NaN rates fail this comparison too.
        if !(rate.value < -self.min_rate) {
            return Ok(Forecast::sentinel(Horizon::NotApproaching, confidence));
        }

        let units = (current - target) / rate.value.abs();
        if !units.is_finite() || units <= 0.0 {
            debug!(current, target, rate = rate.value, "horizon not finite");
            return Ok(Forecast::sentinel(Horizon::NotApproaching, confidence));
        }

        let horizon = if units < 1.0 {
            Horizon::Finite {
                value: self.basis.units_to_subunits(units),
                unit: self.basis.subunit.clone(),
            }
        } else {
            Horizon::Finite {
                value: units,
                unit: self.basis.unit.clone(),
            }
        };

        Ok(Forecast {
            horizon,
            confidence,
            units_remaining: Some(units),
        })
    }
}
