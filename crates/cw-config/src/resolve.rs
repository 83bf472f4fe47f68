//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! /etc → built-in preset.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::forecast::ForecastConfig;
use crate::preset::{get_preset, PresetName};
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_forecast, ValidationError, ValidationResult};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to forecast.json (or None if not found).
    pub forecast: Option<PathBuf>,

    /// Source of the forecast config (for diagnostics).
    pub forecast_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/colony-watch/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_FORECAST_PATH: &str = "CW_FORECAST_CONFIG";
pub const ENV_CONFIG_DIR: &str = "CW_CONFIG_DIR";

/// Standard config file name.
const FORECAST_FILENAME: &str = "forecast.json";

/// Application name for XDG directories.
const APP_NAME: &str = "colony-watch";

/// Resolve the forecast config path.
///
/// 1. Explicit CLI path (an explicit path that does not exist is an error
///    at load time, not a silent fallthrough)
/// 2. CW_FORECAST_CONFIG
/// 3. CW_CONFIG_DIR + forecast.json
/// 4. XDG config directory (~/.config/colony-watch/)
/// 5. System config (/etc/colony-watch/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();

    if let Some(path) = cli_path {
        paths.forecast = Some(path.to_path_buf());
        paths.forecast_source = ConfigSource::CliArgument;
        return paths;
    }

    if let Ok(env_path) = std::env::var(ENV_FORECAST_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            paths.forecast = Some(path);
            paths.forecast_source = ConfigSource::Environment;
            return paths;
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(FORECAST_FILENAME);
        if path.exists() {
            paths.forecast = Some(path);
            paths.forecast_source = ConfigSource::Environment;
            return paths;
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(FORECAST_FILENAME);
        if path.exists() {
            paths.forecast = Some(path);
            paths.forecast_source = ConfigSource::XdgConfig;
            return paths;
        }
    }

    let system_path = system_config_dir().join(FORECAST_FILENAME);
    if system_path.exists() {
        paths.forecast = Some(system_path);
        paths.forecast_source = ConfigSource::SystemConfig;
        return paths;
    }

    paths.forecast_source = ConfigSource::BuiltinDefault;
    paths
}

/// Get the XDG config directory for colony-watch.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

/// A validated config plus the record of where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ForecastConfig,
    pub snapshot: ConfigSnapshot,
}

/// Resolve, read, parse, and validate the forecast config.
///
/// `preset` replaces the built-in default when no file is found; a file, when
/// found, always wins.
pub fn load_config(
    cli_path: Option<&Path>,
    preset: Option<PresetName>,
) -> ValidationResult<LoadedConfig> {
    let paths = resolve_config(cli_path);

    let (config, content) = match &paths.forecast {
        Some(path) => {
            debug!(path = %path.display(), source = %paths.forecast_source, "loading forecast config");
            let content = std::fs::read_to_string(path).map_err(|e| {
                ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            (ForecastConfig::parse_json(&content)?, Some(content))
        }
        None => {
            let name = preset.unwrap_or(PresetName::Default);
            debug!(preset = %name, "no forecast config found, using preset");
            (get_preset(name), None)
        }
    };

    validate_forecast(&config)?;

    let snapshot = match content {
        Some(ref json) => ConfigSnapshot::new(&config, &paths, json),
        None => ConfigSnapshot::from_preset(&config, preset.unwrap_or(PresetName::Default)),
    };

    Ok(LoadedConfig { config, snapshot })
}
