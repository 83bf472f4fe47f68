//! Event names and pipeline stages used as structured log fields.

use serde::{Deserialize, Serialize};

/// Where in a command an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Fixture and history loading.
    Load,
    /// Rate, classification, and horizon per series.
    Forecast,
    /// Worst-status merge and recommendation ranking.
    Aggregate,
    /// Payload rendering.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Forecast => "forecast",
            Stage::Aggregate => "aggregate",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const FIXTURE_LOADED: &str = "fixture.loaded";

    pub const FORECAST_SERIES: &str = "forecast.series";
    pub const FORECAST_HOST_ERROR: &str = "forecast.host_error";

    pub const HEALTH_AGGREGATED: &str = "health.aggregated";
}
