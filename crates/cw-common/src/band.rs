//! Severity bands and cut-table entries.
//!
//! Every band name any domain can produce has exactly one position in
//! [`Band::PRECEDENCE`]. The derived `Ord` follows severity, so `max` picks
//! the worse of two bands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named severity level.
///
/// Declared least severe first so that the derived ordering is severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Nothing to report.
    Healthy,
    /// Functioning, with room for improvement.
    Stable,
    /// Mild risk worth flagging.
    Low,
    /// Moderate risk.
    Medium,
    /// Needs attention before it becomes critical.
    Warning,
    /// Severe risk.
    High,
    /// Immediate action required.
    Critical,
}

impl Band {
    /// Global precedence, most severe first. Total: no two bands share a slot.
    pub const PRECEDENCE: [Band; 7] = [
        Band::Critical,
        Band::High,
        Band::Warning,
        Band::Medium,
        Band::Low,
        Band::Stable,
        Band::Healthy,
    ];

    /// Position in [`Band::PRECEDENCE`] (0 = most severe).
    pub fn rank(self) -> usize {
        match self {
            Band::Critical => 0,
            Band::High => 1,
            Band::Warning => 2,
            Band::Medium => 3,
            Band::Low => 4,
            Band::Stable => 5,
            Band::Healthy => 6,
        }
    }

    /// The least severe band, returned when nothing is reported.
    pub fn least_severe() -> Band {
        Band::Healthy
    }

    /// True if `self` is strictly more severe than `other`.
    pub fn is_worse_than(self, other: Band) -> bool {
        self > other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::Critical => "critical",
            Band::High => "high",
            Band::Warning => "warning",
            Band::Medium => "medium",
            Band::Low => "low",
            Band::Stable => "stable",
            Band::Healthy => "healthy",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Band::Critical),
            "high" => Ok(Band::High),
            "warning" => Ok(Band::Warning),
            "medium" => Ok(Band::Medium),
            "low" => Ok(Band::Low),
            "stable" => Ok(Band::Stable),
            "healthy" => Ok(Band::Healthy),
            _ => Err(format!("unknown band: {}", s)),
        }
    }
}

/// What a cut-table boundary is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `value <= boundary`
    Value,
    /// `value - floor <= boundary`; only meaningful with a floor.
    Distance,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Value => write!(f, "value"),
            Comparison::Distance => write!(f, "distance"),
        }
    }
}

/// One row of a cut table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CutEntry {
    pub band: Band,
    pub boundary: f64,
    #[serde(default = "default_comparison")]
    pub comparison: Comparison,
}

fn default_comparison() -> Comparison {
    Comparison::Value
}

impl CutEntry {
    pub fn value(band: Band, boundary: f64) -> Self {
        CutEntry {
            band,
            boundary,
            comparison: Comparison::Value,
        }
    }

    pub fn distance(band: Band, boundary: f64) -> Self {
        CutEntry {
            band,
            boundary,
            comparison: Comparison::Distance,
        }
    }
}
