//! Configuration validation errors and semantic validation.
//!
//! Field-level checks live here. Cut-table ordering is checked when the
//! engine builds an adapter from the config.

use cw_common::{CutEntry, Lookback};
use std::collections::HashSet;
use thiserror::Error;

use crate::forecast::{ForecastConfig, MoodConfig, ResourceConfig};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for cw_common::Error {
    fn from(err: ValidationError) -> Self {
        cw_common::Error::Config(err.to_string())
    }
}

/// Validate a forecast configuration semantically.
pub fn validate_forecast(config: &ForecastConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if !config.time_basis.is_valid() {
        return Err(ValidationError::InvalidValue {
            field: "time_basis".to_string(),
            message: "ticks_per_unit and subunits_per_unit must be finite and positive"
                .to_string(),
        });
    }

    let mut seen = HashSet::new();
    for (idx, resource) in config.resources.iter().enumerate() {
        validate_resource(idx, resource)?;
        if !seen.insert(resource.name.as_str()) {
            return Err(ValidationError::SemanticError(format!(
                "resource '{}' is configured more than once",
                resource.name
            )));
        }
    }

    validate_mood(&config.mood)?;

    if config.health.top_recommendations == 0 {
        return Err(ValidationError::InvalidValue {
            field: "health.top_recommendations".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    Ok(())
}

fn validate_resource(idx: usize, resource: &ResourceConfig) -> ValidationResult<()> {
    if resource.name.is_empty() {
        return Err(ValidationError::MissingField(format!(
            "resources[{}].name",
            idx
        )));
    }
    let prefix = format!("resources.{}", resource.name);

    validate_series_name(&format!("{}.name", prefix), &resource.name)?;
    validate_finite(&format!("{}.floor", prefix), resource.floor)?;
    validate_finite(&format!("{}.fallback_rate", prefix), resource.fallback_rate)?;
    validate_non_negative(&format!("{}.min_rate", prefix), resource.min_rate)?;
    validate_non_negative(
        &format!("{}.stable_epsilon", prefix),
        resource.stable_epsilon,
    )?;
    validate_lookback(&format!("{}.lookback", prefix), &resource.lookback)?;
    validate_cuts(&format!("{}.level_cuts", prefix), &resource.level_cuts)?;
    validate_cuts(&format!("{}.horizon_cuts", prefix), &resource.horizon_cuts)?;

    Ok(())
}

fn validate_mood(mood: &MoodConfig) -> ValidationResult<()> {
    validate_series_name("mood.domain", &mood.domain)?;
    validate_finite("mood.fallback_rate", mood.fallback_rate)?;
    validate_non_negative("mood.min_thought_rate", mood.min_thought_rate)?;
    validate_non_negative("mood.min_rate", mood.min_rate)?;
    validate_non_negative("mood.stable_epsilon", mood.stable_epsilon)?;
    validate_lookback("mood.lookback", &mood.lookback)?;
    validate_cuts("mood.level_cuts", &mood.level_cuts)?;
    validate_cuts("mood.horizon_cuts", &mood.horizon_cuts)?;

    if !(mood.thought_fallback_divisor.is_finite() && mood.thought_fallback_divisor > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "mood.thought_fallback_divisor".to_string(),
            message: format!("Must be positive, got {}", mood.thought_fallback_divisor),
        });
    }

    Ok(())
}

/// Series names become key prefixes, so they cannot contain the separator.
fn validate_series_name(field: &str, name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }
    if name.contains(':') {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("'{}' must not contain ':'", name),
        });
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be finite, got {}", value),
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be finite and non-negative, got {}", value),
        });
    }
    Ok(())
}

fn validate_lookback(field: &str, lookback: &Lookback) -> ValidationResult<()> {
    match *lookback {
        Lookback::Samples(n) if n < 2 => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("A rate needs at least 2 samples, got {}", n),
        }),
        Lookback::Ticks(0) => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "Tick window must be positive".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_cuts(field: &str, cuts: &[CutEntry]) -> ValidationResult<()> {
    for (idx, cut) in cuts.iter().enumerate() {
        validate_finite(&format!("{}[{}].boundary", field, idx), cut.boundary)?;
    }
    Ok(())
}
