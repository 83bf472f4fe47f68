//! Forecast configuration types.
//!
//! Corresponds to forecast.json. Every field except `schema_version` has a
//! default, so a config file only needs to name what it changes.

use cw_common::{Band, CutEntry, Lookback, ModelKind, TimeBasis, TICKS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::validate::ValidationError;

/// Full adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Store ticks to reporting units, shared by every domain.
    #[serde(default)]
    pub time_basis: TimeBasis,

    /// Tracked consumables, checked in this order.
    #[serde(default = "default_resources")]
    pub resources: Vec<ResourceConfig>,

    #[serde(default)]
    pub mood: MoodConfig,

    #[serde(default)]
    pub health: HealthConfig,
}

/// Human-readable text attached to a band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub issue: String,
    pub recommendation: String,
}

impl Advice {
    pub fn new(issue: &str, recommendation: &str) -> Self {
        Advice {
            issue: issue.to_string(),
            recommendation: recommendation.to_string(),
        }
    }
}

/// One consumable stockpile (food, medicine, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Series domain name, e.g. "food".
    pub name: String,

    /// Display label, e.g. "Food".
    #[serde(default)]
    pub label: String,

    #[serde(default = "default_resource_model")]
    pub model: ModelKind,

    /// Reserve level for the fixed-floor model. Ignored for zero-floor.
    #[serde(default)]
    pub floor: f64,

    /// Rate per reporting unit used when history is too short.
    #[serde(default)]
    pub fallback_rate: f64,

    /// Refuse numeric horizons computed from the fallback rate.
    #[serde(default = "default_true")]
    pub require_measured: bool,

    #[serde(default = "default_resource_lookback")]
    pub lookback: Lookback,

    /// Depletion slower than this counts as not approaching.
    #[serde(default = "default_resource_min_rate")]
    pub min_rate: f64,

    /// Rates within this magnitude are reported as a stable trend.
    #[serde(default = "default_resource_stable_epsilon")]
    pub stable_epsilon: f64,

    /// Cuts on the current stock level, most severe first.
    #[serde(default)]
    pub level_cuts: Vec<CutEntry>,

    /// Cuts on the numeric horizon in reporting units.
    #[serde(default = "default_resource_horizon_cuts")]
    pub horizon_cuts: Vec<CutEntry>,

    #[serde(default)]
    pub advice: BTreeMap<Band, Advice>,
}

/// Colonist mood relative to each colonist's extreme break threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodConfig {
    /// Series domain name; keys are `<domain>:<colonist id>`.
    #[serde(default = "default_mood_domain")]
    pub domain: String,

    /// Rate per day used when neither history nor thoughts give one.
    #[serde(default)]
    pub fallback_rate: f64,

    /// Negative thought magnitude is spread over this many days.
    #[serde(default = "default_thought_divisor")]
    pub thought_fallback_divisor: f64,

    /// Thought-derived daily loss below this is ignored.
    #[serde(default = "default_mood_min_rate")]
    pub min_thought_rate: f64,

    #[serde(default)]
    pub require_measured: bool,

    #[serde(default = "default_mood_lookback")]
    pub lookback: Lookback,

    #[serde(default = "default_mood_min_rate")]
    pub min_rate: f64,

    #[serde(default = "default_mood_stable_epsilon")]
    pub stable_epsilon: f64,

    /// Samples echoed back in each colonist report.
    #[serde(default = "default_recent_samples")]
    pub recent_samples: usize,

    #[serde(default = "default_mood_level_cuts")]
    pub level_cuts: Vec<CutEntry>,

    #[serde(default = "default_mood_horizon_cuts")]
    pub horizon_cuts: Vec<CutEntry>,

    #[serde(default = "default_mood_advice")]
    pub advice: BTreeMap<Band, Advice>,
}

/// How contributors are reported for the overall band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Every subsystem at the winning severity.
    #[default]
    AllContributors,
    /// Only the first subsystem at the winning severity.
    FirstOnly,
}

/// Colony-wide health check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_top_recommendations")]
    pub top_recommendations: usize,

    #[serde(default)]
    pub policy: AggregationPolicy,
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            top_recommendations: default_top_recommendations(),
            policy: AggregationPolicy::default(),
        }
    }
}

impl Default for MoodConfig {
    fn default() -> Self {
        MoodConfig {
            domain: default_mood_domain(),
            fallback_rate: 0.0,
            thought_fallback_divisor: default_thought_divisor(),
            min_thought_rate: default_mood_min_rate(),
            require_measured: false,
            lookback: default_mood_lookback(),
            min_rate: default_mood_min_rate(),
            stable_epsilon: default_mood_stable_epsilon(),
            recent_samples: default_recent_samples(),
            level_cuts: default_mood_level_cuts(),
            horizon_cuts: default_mood_horizon_cuts(),
            advice: default_mood_advice(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            time_basis: TimeBasis::default(),
            resources: default_resources(),
            mood: MoodConfig::default(),
            health: HealthConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse config from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Look up a resource by series name.
    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Names of all configured resources, in check order.
    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.name.as_str()).collect()
    }
}

impl ResourceConfig {
    /// A zero-floor resource with the default horizon cuts and no advice.
    pub fn new(name: &str, label: &str, level_cuts: Vec<CutEntry>) -> Self {
        ResourceConfig {
            name: name.to_string(),
            label: label.to_string(),
            model: default_resource_model(),
            floor: 0.0,
            fallback_rate: 0.0,
            require_measured: true,
            lookback: default_resource_lookback(),
            min_rate: default_resource_min_rate(),
            stable_epsilon: default_resource_stable_epsilon(),
            level_cuts,
            horizon_cuts: default_resource_horizon_cuts(),
            advice: BTreeMap::new(),
        }
    }

    pub fn with_advice(mut self, band: Band, issue: &str, recommendation: &str) -> Self {
        self.advice.insert(band, Advice::new(issue, recommendation));
        self
    }

    /// Label for display, falling back to the series name.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_resource_model() -> ModelKind {
    ModelKind::ZeroFloor
}

fn default_resource_lookback() -> Lookback {
    Lookback::Ticks(7 * TICKS_PER_DAY)
}

fn default_resource_min_rate() -> f64 {
    1e-9
}

fn default_resource_stable_epsilon() -> f64 {
    0.1
}

pub(crate) fn default_resource_horizon_cuts() -> Vec<CutEntry> {
    vec![
        CutEntry::value(Band::Critical, 3.0),
        CutEntry::value(Band::Warning, 7.0),
        CutEntry::value(Band::Low, 14.0),
    ]
}

fn default_mood_domain() -> String {
    "mood".to_string()
}

fn default_thought_divisor() -> f64 {
    10.0
}

fn default_mood_min_rate() -> f64 {
    0.01
}

fn default_mood_lookback() -> Lookback {
    Lookback::Ticks(3 * TICKS_PER_DAY)
}

fn default_mood_stable_epsilon() -> f64 {
    0.02
}

fn default_recent_samples() -> usize {
    10
}

fn default_top_recommendations() -> usize {
    5
}

pub(crate) fn default_mood_level_cuts() -> Vec<CutEntry> {
    vec![
        CutEntry::distance(Band::Critical, 0.0),
        CutEntry::distance(Band::High, 0.05),
        CutEntry::distance(Band::Medium, 0.10),
        CutEntry::value(Band::Low, 0.35),
    ]
}

/// Horizon boundary that matches every finite forecast. Cut boundaries
/// must be finite, so this stands in for "any fall at all".
pub const ANY_HORIZON: f64 = f64::MAX;

pub(crate) fn default_mood_horizon_cuts() -> Vec<CutEntry> {
    vec![
        CutEntry::value(Band::Critical, 4.0 / 24.0),
        CutEntry::value(Band::High, 2.0),
        // A colonist heading for a break is worth a look however far out.
        CutEntry::value(Band::Medium, ANY_HORIZON),
    ]
}

fn default_mood_advice() -> BTreeMap<Band, Advice> {
    let mut advice = BTreeMap::new();
    advice.insert(
        Band::Critical,
        Advice::new(
            "Colonist at or past the extreme mental break threshold",
            "URGENT: Give the colonist recreation, a good meal, and rest immediately",
        ),
    );
    advice.insert(
        Band::High,
        Advice::new(
            "Colonist close to a mental break",
            "Reduce workload and schedule recreation time",
        ),
    );
    advice.insert(
        Band::Medium,
        Advice::new(
            "Colonist mood trending toward break range",
            "Improve room impressiveness and meal quality",
        ),
    );
    advice.insert(
        Band::Low,
        Advice::new("Colonist mood below 35%", "Check negative thoughts for quick wins"),
    );
    advice
}

fn default_resources() -> Vec<ResourceConfig> {
    vec![
        ResourceConfig::new(
            "food",
            "Food",
            vec![
                CutEntry::value(Band::Critical, 0.0),
                CutEntry::value(Band::Warning, 10.0),
                CutEntry::value(Band::Low, 30.0),
            ],
        )
        .with_advice(
            Band::Critical,
            "Food nearly exhausted",
            "URGENT: Hunt animals, harvest crops, or buy food immediately",
        )
        .with_advice(
            Band::Warning,
            "Low food reserves",
            "Increase food production - plant more crops or hunt",
        )
        .with_advice(
            Band::Low,
            "Food reserves trending down",
            "Plan the next harvest or hunting trip",
        ),
        ResourceConfig::new(
            "medicine",
            "Medicine",
            vec![
                CutEntry::value(Band::Critical, 0.0),
                CutEntry::value(Band::Warning, 5.0),
                CutEntry::value(Band::Low, 10.0),
            ],
        )
        .with_advice(
            Band::Critical,
            "Out of medicine",
            "URGENT: Craft or purchase medicine",
        )
        .with_advice(Band::Warning, "Low medicine", "Craft or purchase medicine")
        .with_advice(
            Band::Low,
            "Medicine stock running down",
            "Queue medicine crafting before the next raid",
        ),
        ResourceConfig::new(
            "wood",
            "Wood",
            vec![
                CutEntry::value(Band::Critical, 0.0),
                CutEntry::value(Band::Warning, 100.0),
                CutEntry::value(Band::Low, 300.0),
            ],
        )
        .with_advice(
            Band::Critical,
            "No wood left",
            "URGENT: Cut trees or trade for wood",
        )
        .with_advice(Band::Warning, "Low wood reserves", "Designate trees for cutting")
        .with_advice(
            Band::Low,
            "Wood stock declining",
            "Keep a grower zone of trees near the base",
        ),
        ResourceConfig::new(
            "steel",
            "Steel",
            vec![
                CutEntry::value(Band::Critical, 50.0),
                CutEntry::value(Band::Warning, 200.0),
            ],
        )
        .with_advice(
            Band::Critical,
            "Critically low on steel",
            "URGENT: Mine steel or trade for materials",
        )
        .with_advice(Band::Warning, "Low steel reserves", "Mine more steel deposits")
        .with_advice(
            Band::Low,
            "Steel stock declining",
            "Schedule mining before reserves drop further",
        ),
    ]
}
