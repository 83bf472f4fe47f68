//! Configuration snapshots for reproducibility.
//!
//! A snapshot records exactly which configuration a report was computed
//! with, so two reports can be compared knowing whether the cut tables
//! changed between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::forecast::ForecastConfig;
use crate::preset::PresetName;
use crate::resolve::{ConfigPaths, ConfigSource};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Hostname where snapshot was taken.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the config was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// Source of the configuration.
    pub source: String,

    /// Preset used when no file was found.
    #[serde(default)]
    pub preset: Option<String>,

    /// SHA-256 of the file content, or of the preset's canonical JSON.
    pub content_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    /// Tracked resource names, in check order.
    pub resources: Vec<String>,

    /// Reporting unit (e.g. "days").
    pub unit: String,

    /// Whether mood horizons require measured history.
    pub mood_requires_measured: bool,

    /// Bound on the recommendation list.
    pub top_recommendations: usize,
}

impl ConfigSnapshot {
    /// Snapshot of a config loaded from a file.
    pub fn new(config: &ForecastConfig, paths: &ConfigPaths, content: &str) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            hostname: current_hostname(),
            schema_version: config.schema_version.clone(),
            path: paths.forecast.as_ref().map(|p| p.display().to_string()),
            source: paths.forecast_source.to_string(),
            preset: None,
            content_hash: hash_content(content),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Snapshot of a built-in preset.
    pub fn from_preset(config: &ForecastConfig, preset: PresetName) -> Self {
        let canonical = serde_json::to_string(config).unwrap_or_else(|_| preset.to_string());
        ConfigSnapshot {
            timestamp: Utc::now(),
            hostname: current_hostname(),
            schema_version: config.schema_version.clone(),
            path: None,
            source: ConfigSource::BuiltinDefault.to_string(),
            preset: Some(preset.to_string()),
            content_hash: hash_content(&canonical),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.content_hash == other.content_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.content_hash[..12.min(self.content_hash.len())]
    }
}

impl ConfigSummary {
    fn from_config(config: &ForecastConfig) -> Self {
        ConfigSummary {
            resources: config.resources.iter().map(|r| r.name.clone()).collect(),
            unit: config.time_basis.unit.clone(),
            mood_requires_measured: config.mood.require_measured,
            top_recommendations: config.health.top_recommendations,
        }
    }
}

fn current_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().to_string())
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
