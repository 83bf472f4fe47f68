//! Domain-independent forecasting primitives.
//!
//! - [`rate`]: signed rate of change from a history window
//! - [`classify`]: first-match cut tables
//! - [`horizon`]: time-to-threshold under the zero-floor or fixed-floor model
//! - [`aggregate`]: worst-status-wins merge across subsystems
//!
//! Nothing in here knows about food or mood; adapters supply the numbers.

pub mod aggregate;
pub mod classify;
pub mod horizon;
pub mod rate;

pub use aggregate::{aggregate, OverallStatus, SubsystemStatus};
pub use classify::CutTable;
pub use horizon::{Confidence, EventForecaster, Forecast, Horizon};
pub use rate::{FallbackReason, RateBasis, RateCalculator, RateEstimate, SignPolicy, Trend};
