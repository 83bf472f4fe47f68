//! JSON Schema generation for produced shapes.
//!
//! ```bash
//! cw-core schema --list
//! cw-core schema ResourceReport
//! cw-core schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::adapters::{
    Assessment, HighRiskColonist, MoodOverview, MoodReport, RecentSample, ResourceReport,
};
pub use crate::forecast::{
    Confidence, Forecast, Horizon, OverallStatus, RateBasis, RateEstimate, SubsystemStatus, Trend,
};
pub use crate::health::{HealthReport, SubsystemFinding};
pub use cw_common::{Band, CutEntry, SeriesKey, Snapshot};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Band", "Severity band in global precedence order"),
        ("CutEntry", "One row of a cut table"),
        ("SeriesKey", "Identifier of a tracked series"),
        ("Snapshot", "Timestamped sample"),
        ("RateBasis", "Whether a rate was measured or fell back"),
        ("RateEstimate", "Signed rate of change with provenance"),
        ("Trend", "Rising, falling, or stable"),
        ("Horizon", "Time to threshold or a sentinel"),
        ("Confidence", "Measured or estimated horizon"),
        ("Forecast", "Horizon with confidence"),
        ("Assessment", "Rate, bands, and forecast for one series"),
        ("ResourceReport", "Stockpile forecast with advice"),
        ("RecentSample", "Historical sample relative to now"),
        ("MoodReport", "Colonist mood forecast against break threshold"),
        ("HighRiskColonist", "Colonist at high mood risk or worse"),
        ("MoodOverview", "Mood reports with high-risk summary"),
        ("SubsystemStatus", "Subsystem band"),
        ("OverallStatus", "Worst band and its contributors"),
        ("SubsystemFinding", "Subsystem band with issues and recommendations"),
        ("HealthReport", "Colony health report"),
    ]
}

/// Generate JSON Schema for a type by name.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "Band" => schema_for!(Band),
        "CutEntry" => schema_for!(CutEntry),
        "SeriesKey" => schema_for!(SeriesKey),
        "Snapshot" => schema_for!(Snapshot),
        "RateBasis" => schema_for!(RateBasis),
        "RateEstimate" => schema_for!(RateEstimate),
        "Trend" => schema_for!(Trend),
        "Horizon" => schema_for!(Horizon),
        "Confidence" => schema_for!(Confidence),
        "Forecast" => schema_for!(Forecast),
        "Assessment" => schema_for!(Assessment),
        "ResourceReport" => schema_for!(ResourceReport),
        "RecentSample" => schema_for!(RecentSample),
        "MoodReport" => schema_for!(MoodReport),
        "HighRiskColonist" => schema_for!(HighRiskColonist),
        "MoodOverview" => schema_for!(MoodOverview),
        "SubsystemStatus" => schema_for!(SubsystemStatus),
        "OverallStatus" => schema_for!(OverallStatus),
        "SubsystemFinding" => schema_for!(SubsystemFinding),
        "HealthReport" => schema_for!(HealthReport),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate every schema, keyed by type name.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}
