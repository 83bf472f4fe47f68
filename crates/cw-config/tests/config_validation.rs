//! Configuration validation + resolution tests against real files.
//!
//! Covers:
//! - forecast.json validation for valid and broken files
//! - Resolution order (CLI > env file > config dir > XDG)
//! - Preset determinism and snapshot hashing

use cw_config::preset::{get_preset, list_presets, PresetName};
use cw_config::resolve::{load_config, resolve_config, ConfigSource};
use cw_config::validate::{validate_forecast, ValidationError};
use cw_config::ForecastConfig;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const ENV_KEYS: &[&str] = &["CW_FORECAST_CONFIG", "CW_CONFIG_DIR", "XDG_CONFIG_HOME"];

const VALID_CONFIG: &str = r#"{
    "schema_version": "1.0.0",
    "description": "test colony",
    "resources": [
        {
            "name": "food",
            "label": "Food",
            "level_cuts": [
                {"band": "critical", "boundary": 0.0},
                {"band": "warning", "boundary": 15.0}
            ],
            "advice": {
                "critical": {"issue": "No food", "recommendation": "Hunt now"}
            }
        },
        {
            "name": "silver",
            "fallback_rate": -5.0,
            "lookback": {"kind": "samples", "n": 4}
        }
    ],
    "mood": {"recent_samples": 5},
    "health": {"top_recommendations": 3, "policy": "first_only"}
}"#;

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let saved = keys.iter().map(|key| env::var(key).ok()).collect();
        for key in keys {
            env::remove_var(key);
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f()
}

fn write_config(dir: &Path, content: &str) {
    fs::create_dir_all(dir).expect("create config dir");
    fs::write(dir.join("forecast.json"), content).expect("write forecast.json");
}

#[test]
fn test_valid_config_passes() {
    let config = ForecastConfig::parse_json(VALID_CONFIG).expect("parse");
    validate_forecast(&config).expect("valid config should pass validation");
    assert_eq!(config.resource_names(), vec!["food", "silver"]);
    assert_eq!(config.mood.recent_samples, 5);
    assert_eq!(config.health.top_recommendations, 3);
}

#[test]
fn test_rejects_wrong_version() {
    let config = ForecastConfig::parse_json(r#"{"schema_version": "2.0.0"}"#).expect("parse");
    let err = validate_forecast(&config).expect_err("wrong version should fail");
    assert!(matches!(err, ValidationError::VersionMismatch { .. }));
}

#[test]
fn test_rejects_single_sample_lookback() {
    let json = r#"{
        "schema_version": "1.0.0",
        "resources": [{"name": "food", "lookback": {"kind": "samples", "n": 1}}]
    }"#;
    let config = ForecastConfig::parse_json(json).expect("parse");
    let err = validate_forecast(&config).expect_err("one-sample window should fail");
    assert_eq!(err.code(), 65);
}

#[test]
fn test_rejects_bad_time_basis() {
    let json = r#"{
        "schema_version": "1.0.0",
        "time_basis": {"ticks_per_unit": 0.0, "unit": "days", "subunit": "hours", "subunits_per_unit": 24.0}
    }"#;
    let config = ForecastConfig::parse_json(json).expect("parse");
    assert!(validate_forecast(&config).is_err());
}

#[test]
fn test_rejects_unknown_band_name() {
    let json = r#"{
        "schema_version": "1.0.0",
        "resources": [{"name": "food", "level_cuts": [{"band": "dire", "boundary": 1.0}]}]
    }"#;
    let err = ForecastConfig::parse_json(json).expect_err("unknown band should not parse");
    assert_eq!(err.code(), 61);
}

#[test]
fn test_resolve_cli_over_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        let cli_dir = temp.path().join("cli");
        let env_dir = temp.path().join("env");
        write_config(&cli_dir, VALID_CONFIG);
        write_config(&env_dir, VALID_CONFIG);

        env::set_var(
            "CW_FORECAST_CONFIG",
            env_dir.join("forecast.json").display().to_string(),
        );

        let cli_path = cli_dir.join("forecast.json");
        let paths = resolve_config(Some(&cli_path));
        assert_eq!(paths.forecast_source, ConfigSource::CliArgument);
        assert_eq!(paths.forecast.unwrap(), cli_path);
    });
}

#[test]
fn test_resolve_env_file_over_config_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        let env_dir = temp.path().join("env");
        let config_dir = temp.path().join("config_dir");
        write_config(&env_dir, VALID_CONFIG);
        write_config(&config_dir, VALID_CONFIG);

        env::set_var(
            "CW_FORECAST_CONFIG",
            env_dir.join("forecast.json").display().to_string(),
        );
        env::set_var("CW_CONFIG_DIR", config_dir.display().to_string());

        let paths = resolve_config(None);
        assert_eq!(paths.forecast_source, ConfigSource::Environment);
        assert_eq!(paths.forecast.unwrap(), env_dir.join("forecast.json"));
    });
}

#[test]
fn test_resolve_config_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        let config_dir = temp.path().join("config_dir");
        write_config(&config_dir, VALID_CONFIG);

        env::set_var("CW_CONFIG_DIR", config_dir.display().to_string());

        let paths = resolve_config(None);
        assert_eq!(paths.forecast_source, ConfigSource::Environment);
        assert_eq!(paths.forecast.unwrap(), config_dir.join("forecast.json"));
    });
}

#[cfg(target_os = "linux")]
#[test]
fn test_resolve_xdg_fallback() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        let xdg_dir = temp.path().join("xdg");
        let app_dir = xdg_dir.join("colony-watch");
        write_config(&app_dir, VALID_CONFIG);

        env::set_var("XDG_CONFIG_HOME", xdg_dir.display().to_string());

        let paths = resolve_config(None);
        assert_eq!(paths.forecast_source, ConfigSource::XdgConfig);
        assert_eq!(paths.forecast.unwrap(), app_dir.join("forecast.json"));
    });
}

#[test]
fn test_load_config_records_file_hash() {
    let temp = TempDir::new().expect("temp dir");
    write_config(temp.path(), VALID_CONFIG);
    let path = temp.path().join("forecast.json");

    let loaded = load_config(Some(&path), None).expect("load");
    assert_eq!(loaded.snapshot.source, "CLI argument");
    assert!(loaded.snapshot.preset.is_none());
    assert_eq!(loaded.snapshot.content_hash.len(), 64);
    assert_eq!(loaded.snapshot.summary.resources, vec!["food", "silver"]);
}

#[test]
fn test_load_config_rejects_invalid_file() {
    let temp = TempDir::new().expect("temp dir");
    write_config(
        temp.path(),
        r#"{"schema_version": "1.0.0", "health": {"top_recommendations": 0}}"#,
    );
    let path = temp.path().join("forecast.json");

    let err = load_config(Some(&path), None).expect_err("zero top-N should fail");
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn test_presets_are_deterministic() {
    let first = get_preset(PresetName::Cautious);
    let second = get_preset(PresetName::Cautious);
    let first_json = serde_json::to_string(&first).expect("serialize preset");
    let second_json = serde_json::to_string(&second).expect("serialize preset");
    assert_eq!(first_json, second_json);

    let presets = list_presets();
    assert!(presets
        .iter()
        .any(|p| p.name == PresetName::Cautious.as_str()));
}
