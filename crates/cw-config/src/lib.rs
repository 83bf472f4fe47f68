//! Colony Watch configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for forecast.json (domain adapter settings)
//! - Built-in presets
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Schema and semantic validation
//! - Config snapshots recording what a run was computed with

pub mod forecast;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use forecast::{
    Advice, AggregationPolicy, ForecastConfig, HealthConfig, MoodConfig, ResourceConfig,
};
pub use preset::{get_preset, list_presets, PresetName};
pub use resolve::{load_config, resolve_config, ConfigPaths, ConfigSource, LoadedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
