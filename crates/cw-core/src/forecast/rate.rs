//! Rate of change from a short history.
//!
//! Two-point slope between the oldest and newest sample inside the lookback
//! window. Anything that would make the slope meaningless (too few samples,
//! no elapsed time, a timestamp regression, a non-finite value) yields the
//! domain's fallback constant instead of an error.

use cw_common::{Lookback, Snapshot, TimeBasis};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// Computed from two or more samples.
    Measured,
    /// The domain's default constant.
    FallbackDefault,
}

/// Why a measured rate could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Fewer than two samples inside the window.
    TooFewSamples,
    /// Oldest and newest samples share a timestamp.
    NoElapsedTime,
    /// A sample is older than the one before it.
    TimestampRegression,
    /// A sample value is NaN or infinite.
    NonFiniteSample,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::TooFewSamples => write!(f, "too_few_samples"),
            FallbackReason::NoElapsedTime => write!(f, "no_elapsed_time"),
            FallbackReason::TimestampRegression => write!(f, "timestamp_regression"),
            FallbackReason::NonFiniteSample => write!(f, "non_finite_sample"),
        }
    }
}

/// Signed rate per reporting unit. Positive means the quantity is growing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RateEstimate {
    pub value: f64,
    pub basis: RateBasis,
    /// Samples inside the lookback window.
    pub samples: usize,
    /// Reporting units between the oldest and newest sample used.
    pub span: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

impl RateEstimate {
    pub fn measured(value: f64, samples: usize, span: f64) -> Self {
        RateEstimate {
            value,
            basis: RateBasis::Measured,
            samples,
            span,
            fallback_reason: None,
        }
    }

    pub fn fallback(value: f64, samples: usize, reason: FallbackReason) -> Self {
        RateEstimate {
            value,
            basis: RateBasis::FallbackDefault,
            samples,
            span: 0.0,
            fallback_reason: Some(reason),
        }
    }

    pub fn is_measured(&self) -> bool {
        self.basis == RateBasis::Measured
    }
}

/// What to do with a measured rate's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignPolicy {
    /// Keep the sign; rising values are meaningful.
    #[default]
    Preserve,
    /// Positive rates become 0.0; the quantity is only tracked while it drains.
    DepletionOnly,
}

/// Direction of travel, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Rates with magnitude below `epsilon` (or exactly zero) are stable.
    pub fn from_rate(rate: f64, epsilon: f64) -> Trend {
        if rate == 0.0 || rate.abs() < epsilon || !rate.is_finite() {
            Trend::Stable
        } else if rate > 0.0 {
            Trend::Rising
        } else {
            Trend::Falling
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Rising => write!(f, "rising"),
            Trend::Falling => write!(f, "falling"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

/// Per-domain rate settings.
#[derive(Debug, Clone)]
pub struct RateCalculator {
    pub lookback: Lookback,
    pub ticks_per_unit: f64,
    pub fallback_rate: f64,
    pub sign_policy: SignPolicy,
}

impl RateCalculator {
    pub fn new(lookback: Lookback, basis: &TimeBasis, fallback_rate: f64) -> Self {
        RateCalculator {
            lookback,
            ticks_per_unit: basis.ticks_per_unit,
            fallback_rate,
            sign_policy: SignPolicy::Preserve,
        }
    }

    pub fn with_sign_policy(mut self, policy: SignPolicy) -> Self {
        self.sign_policy = policy;
        self
    }

    /// Estimate using the configured fallback constant.
    pub fn estimate(&self, series: &[Snapshot]) -> RateEstimate {
        self.estimate_with_fallback(series, self.fallback_rate)
    }

    /// Estimate with a caller-supplied fallback (e.g. derived from live state).
    pub fn estimate_with_fallback(&self, series: &[Snapshot], fallback: f64) -> RateEstimate {
        let window = self.lookback.apply(series);
        let samples = window.len();

        let (oldest, newest) = match (window.first(), window.last()) {
            (Some(first), Some(last)) if samples >= 2 => (first, last),
            _ => return self.fall_back(fallback, samples, FallbackReason::TooFewSamples),
        };

        if window.iter().any(|s| !s.value.is_finite()) {
            return self.fall_back(fallback, samples, FallbackReason::NonFiniteSample);
        }
        if window.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
            return self.fall_back(fallback, samples, FallbackReason::TimestampRegression);
        }
        if newest.timestamp <= oldest.timestamp {
            return self.fall_back(fallback, samples, FallbackReason::NoElapsedTime);
        }

        let elapsed_units = (newest.timestamp - oldest.timestamp) as f64 / self.ticks_per_unit;
        let mut rate = (newest.value - oldest.value) / elapsed_units;
        if self.sign_policy == SignPolicy::DepletionOnly && rate > 0.0 {
            rate = 0.0;
        }

        RateEstimate::measured(rate, samples, elapsed_units)
    }

    fn fall_back(&self, fallback: f64, samples: usize, reason: FallbackReason) -> RateEstimate {
        debug!(samples, %reason, fallback, "rate falling back to domain default");
        RateEstimate::fallback(fallback, samples, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_common::TICKS_PER_DAY;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn calc() -> RateCalculator {
        RateCalculator::new(Lookback::All, &TimeBasis::default(), -1.5)
    }

    #[test]
    fn test_empty_series_falls_back() {
        let rate = calc().estimate(&[]);
        assert_eq!(rate.basis, RateBasis::FallbackDefault);
        assert_eq!(rate.value, -1.5);
        assert_eq!(rate.fallback_reason, Some(FallbackReason::TooFewSamples));
    }

    #[test]
    fn test_single_sample_falls_back() {
        let rate = calc().estimate(&[Snapshot::new(0, 50.0)]);
        assert_eq!(rate.basis, RateBasis::FallbackDefault);
        assert_eq!(rate.samples, 1);
    }

    #[test]
    fn test_one_day_burn() {
        let series = [Snapshot::new(0, 30.0), Snapshot::new(TICKS_PER_DAY, 20.0)];
        let rate = calc().estimate(&series);
        assert_eq!(rate.basis, RateBasis::Measured);
        assert!(approx_eq(rate.value, -10.0));
        assert!(approx_eq(rate.span, 1.0));
    }

    #[test]
    fn test_uses_only_endpoints() {
        let series = [
            Snapshot::new(0, 10.0),
            Snapshot::new(TICKS_PER_DAY / 2, 100.0),
            Snapshot::new(TICKS_PER_DAY, 12.0),
        ];
        assert!(approx_eq(calc().estimate(&series).value, 2.0));
    }

    #[test]
    fn test_duplicate_timestamps_fall_back() {
        let series = [Snapshot::new(100, 10.0), Snapshot::new(100, 5.0)];
        let rate = calc().estimate(&series);
        assert_eq!(rate.fallback_reason, Some(FallbackReason::NoElapsedTime));
    }

    #[test]
    fn test_regression_falls_back() {
        let series = [
            Snapshot::new(100, 10.0),
            Snapshot::new(50, 9.0),
            Snapshot::new(200, 8.0),
        ];
        let rate = calc().estimate(&series);
        assert_eq!(rate.fallback_reason, Some(FallbackReason::TimestampRegression));
    }

    #[test]
    fn test_non_finite_falls_back() {
        let series = [Snapshot::new(0, f64::NAN), Snapshot::new(100, 1.0)];
        let rate = calc().estimate(&series);
        assert_eq!(rate.fallback_reason, Some(FallbackReason::NonFiniteSample));
    }

    #[test]
    fn test_lookback_window_limits_slope() {
        let series = [
            Snapshot::new(0, 100.0),
            Snapshot::new(TICKS_PER_DAY, 50.0),
            Snapshot::new(2 * TICKS_PER_DAY, 48.0),
        ];
        let calc = RateCalculator::new(Lookback::Samples(2), &TimeBasis::default(), 0.0);
        assert!(approx_eq(calc.estimate(&series).value, -2.0));

        let calc = RateCalculator::new(Lookback::Ticks(TICKS_PER_DAY), &TimeBasis::default(), 0.0);
        assert!(approx_eq(calc.estimate(&series).value, -2.0));
    }

    #[test]
    fn test_window_with_one_sample_falls_back() {
        let series = [Snapshot::new(0, 100.0), Snapshot::new(10 * TICKS_PER_DAY, 50.0)];
        let calc = RateCalculator::new(Lookback::Ticks(TICKS_PER_DAY), &TimeBasis::default(), 0.0);
        assert_eq!(calc.estimate(&series).basis, RateBasis::FallbackDefault);
    }

    #[test]
    fn test_depletion_only_clamps_growth() {
        let series = [Snapshot::new(0, 10.0), Snapshot::new(TICKS_PER_DAY, 40.0)];
        let calc = calc().with_sign_policy(SignPolicy::DepletionOnly);
        let rate = calc.estimate(&series);
        assert_eq!(rate.value, 0.0);
        assert!(rate.is_measured());

        let draining = [Snapshot::new(0, 40.0), Snapshot::new(TICKS_PER_DAY, 10.0)];
        assert!(approx_eq(calc.estimate(&draining).value, -30.0));
    }

    #[test]
    fn test_preserve_keeps_rising_sign() {
        let series = [Snapshot::new(0, 0.30), Snapshot::new(TICKS_PER_DAY, 0.35)];
        assert!(approx_eq(calc().estimate(&series).value, 0.05));
    }

    #[test]
    fn test_caller_fallback_overrides_constant() {
        let rate = calc().estimate_with_fallback(&[], -0.3);
        assert_eq!(rate.value, -0.3);
    }

    #[test]
    fn test_trend_from_rate() {
        assert_eq!(Trend::from_rate(0.01, 0.02), Trend::Stable);
        assert_eq!(Trend::from_rate(-0.01, 0.02), Trend::Stable);
        assert_eq!(Trend::from_rate(0.05, 0.02), Trend::Rising);
        assert_eq!(Trend::from_rate(-0.05, 0.02), Trend::Falling);
        assert_eq!(Trend::from_rate(0.0, 0.0), Trend::Stable);
    }
}
