//! Built-in configuration presets.
//!
//! - Default: cut tables from the colony health check
//! - Cautious: wider horizon bands, flags trouble earlier
//! - Lenient: narrower horizon bands for well-stocked late-game colonies

use cw_common::{Band, CutEntry};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::forecast::{AggregationPolicy, ForecastConfig, ANY_HORIZON};

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Cut tables from the colony health check
    Default,
    /// Earlier warnings, measured mood data required for horizons
    Cautious,
    /// Later warnings, shorter recommendation list
    Lenient,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] =
        &[PresetName::Default, PresetName::Cautious, PresetName::Lenient];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Cautious => "cautious",
            PresetName::Lenient => "lenient",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "default" | "standard" => Some(PresetName::Default),
            "cautious" | "safe" | "early" => Some(PresetName::Cautious),
            "lenient" | "relaxed" | "late" => Some(PresetName::Lenient),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Default => "Food critical under 3 days, warning under 7 days",
            PresetName::Cautious => {
                "Critical under 5 days, warning under 10 days; mood horizons need measured data"
            }
            PresetName::Lenient => "Critical under 2 days, warning under 5 days; top 3 actions",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Get the config for a preset.
pub fn get_preset(name: PresetName) -> ForecastConfig {
    match name {
        PresetName::Default => ForecastConfig::default(),
        PresetName::Cautious => cautious_preset(),
        PresetName::Lenient => lenient_preset(),
    }
}

fn horizon_cuts(critical: f64, warning: f64, low: f64) -> Vec<CutEntry> {
    vec![
        CutEntry::value(Band::Critical, critical),
        CutEntry::value(Band::Warning, warning),
        CutEntry::value(Band::Low, low),
    ]
}

fn cautious_preset() -> ForecastConfig {
    let mut config = ForecastConfig {
        description: Some("Cautious preset: flag shortages early".to_string()),
        ..ForecastConfig::default()
    };
    for resource in &mut config.resources {
        resource.horizon_cuts = horizon_cuts(5.0, 10.0, 20.0);
    }
    config.mood.require_measured = true;
    config.mood.horizon_cuts = vec![
        CutEntry::value(Band::Critical, 12.0 / 24.0),
        CutEntry::value(Band::High, 3.0),
        CutEntry::value(Band::Medium, ANY_HORIZON),
    ];
    config
}

fn lenient_preset() -> ForecastConfig {
    let mut config = ForecastConfig {
        description: Some("Lenient preset: only near-term shortages".to_string()),
        ..ForecastConfig::default()
    };
    for resource in &mut config.resources {
        resource.horizon_cuts = horizon_cuts(2.0, 5.0, 10.0);
    }
    config.health.top_recommendations = 3;
    config.health.policy = AggregationPolicy::FirstOnly;
    config
}

/// Summary of a preset for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
}

/// List all available presets with descriptions.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|p| PresetInfo {
            name: p.as_str().to_string(),
            description: p.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_forecast;

    #[test]
    fn test_preset_name_parse() {
        assert_eq!(PresetName::parse("default"), Some(PresetName::Default));
        assert_eq!(PresetName::parse("SAFE"), Some(PresetName::Cautious));
        assert_eq!(PresetName::parse("relaxed"), Some(PresetName::Lenient));
        assert_eq!(PresetName::parse("paranoid"), None);
    }

    #[test]
    fn test_from_str_error_lists_presets() {
        let err = "nope".parse::<PresetName>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("default"));
        assert!(msg.contains("lenient"));
    }

    #[test]
    fn test_all_presets_validate() {
        for name in PresetName::ALL {
            let config = get_preset(*name);
            assert!(
                validate_forecast(&config).is_ok(),
                "preset {} failed validation",
                name
            );
        }
    }

    #[test]
    fn test_cautious_widens_horizons() {
        let default = get_preset(PresetName::Default);
        let cautious = get_preset(PresetName::Cautious);
        assert!(cautious.resources[0].horizon_cuts[0].boundary > default.resources[0].horizon_cuts[0].boundary);
        assert!(cautious.mood.require_measured);
    }

    #[test]
    fn test_lenient_shortens_recommendations() {
        let lenient = get_preset(PresetName::Lenient);
        assert_eq!(lenient.health.top_recommendations, 3);
        assert_eq!(lenient.health.policy, AggregationPolicy::FirstOnly);
    }

    #[test]
    fn test_list_presets() {
        let presets = list_presets();
        assert_eq!(presets.len(), PresetName::ALL.len());
        assert_eq!(presets[0].name, "default");
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(PresetName::Cautious.to_string(), "cautious");
    }
}
