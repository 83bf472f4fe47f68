//! Error types for Colony Watch.
//!
//! Three kinds of trouble are kept apart:
//! - Missing or short history is *not* an error; forecasts report it as a
//!   first-class result.
//! - Adapter misconfiguration (bad cut tables, model mismatch) is raised when
//!   an adapter is built, never per call.
//! - Host failures (entity gone, store unreachable) propagate to the caller
//!   as their own variants.
//!
//! Errors serialize to structured JSON for the tool-call layer:
//! ```json
//! {
//!   "code": 30,
//!   "category": "host",
//!   "message": "entity not found: Human1042",
//!   "recoverable": false,
//!   "context": { "entity_id": "Human1042" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Colony Watch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file and adapter construction errors.
    Config,
    /// Malformed input handed to the engine by the host.
    Input,
    /// The host simulation or snapshot store failed.
    Host,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Host => write!(f, "host"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Colony Watch.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid cut table for {domain}: {reason}")]
    InvalidCutTable { domain: String, reason: String },

    #[error("model mismatch for {domain}: {reason}")]
    ModelMismatch { domain: String, reason: String },

    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    // Input errors (20-29)
    #[error("snapshot out of order for {key}: {timestamp} is before {last}")]
    OutOfOrderSnapshot {
        key: String,
        timestamp: u64,
        last: u64,
    },

    #[error("non-finite value for {field}")]
    NonFiniteValue { field: String },

    // Host errors (30-39)
    #[error("entity not found: {entity_id}")]
    EntityNotFound { entity_id: String },

    #[error("snapshot store unavailable: {0}")]
    StoreUnavailable(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Host errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidCutTable { .. } => 11,
            Error::ModelMismatch { .. } => 12,
            Error::UnknownDomain(_) => 13,
            Error::OutOfOrderSnapshot { .. } => 20,
            Error::NonFiniteValue { .. } => 21,
            Error::EntityNotFound { .. } => 30,
            Error::StoreUnavailable(_) => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::InvalidCutTable { .. }
            | Error::ModelMismatch { .. }
            | Error::UnknownDomain(_) => ErrorCategory::Config,

            Error::OutOfOrderSnapshot { .. } | Error::NonFiniteValue { .. } => {
                ErrorCategory::Input
            }

            Error::EntityNotFound { .. } | Error::StoreUnavailable(_) => ErrorCategory::Host,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether retrying the same call could succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Adapter configuration must be fixed, not retried
            Error::Config(_)
            | Error::InvalidCutTable { .. }
            | Error::ModelMismatch { .. }
            | Error::UnknownDomain(_) => false,

            Error::OutOfOrderSnapshot { .. } | Error::NonFiniteValue { .. } => false,

            Error::EntityNotFound { .. } => false, // Entity is gone
            Error::StoreUnavailable(_) => true,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidCutTable { .. } => "Invalid Cut Table",
            Error::ModelMismatch { .. } => "Forecast Model Mismatch",
            Error::UnknownDomain(_) => "Unknown Domain",
            Error::OutOfOrderSnapshot { .. } => "Snapshot Out Of Order",
            Error::NonFiniteValue { .. } => "Non-Finite Value",
            Error::EntityNotFound { .. } => "Entity Not Found",
            Error::StoreUnavailable(_) => "Snapshot Store Unavailable",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::UnknownDomain(_) => {
                "Run 'cw-core check' to validate forecast.json, or list defaults with 'cw-core presets'."
            }
            Error::InvalidCutTable { .. } => {
                "Order cut-table rows most severe first with non-decreasing boundaries per comparison kind."
            }
            Error::ModelMismatch { .. } => {
                "Distance comparisons need the fixed-floor model; use value comparisons for zero-floor domains."
            }
            Error::OutOfOrderSnapshot { .. } => {
                "Record snapshots in tick order. Older samples cannot be appended after newer ones."
            }
            Error::NonFiniteValue { .. } => "Pass finite current values and floors.",
            Error::EntityNotFound { .. } => {
                "The colonist no longer exists on the current map. Refresh the colonist list."
            }
            Error::StoreUnavailable(_) => "The history store could not be read. Retry the query.",
            Error::Io(_) => "Check that the input file exists and is readable.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., entity id).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::EntityNotFound { entity_id } => {
                context.insert("entity_id".to_string(), serde_json::json!(entity_id));
            }
            Error::InvalidCutTable { domain, .. } | Error::ModelMismatch { domain, .. } => {
                context.insert("domain".to_string(), serde_json::json!(domain));
            }
            Error::OutOfOrderSnapshot {
                key,
                timestamp,
                last,
            } => {
                context.insert("series".to_string(), serde_json::json!(key));
                context.insert("timestamp".to_string(), serde_json::json!(timestamp));
                context.insert("last_timestamp".to_string(), serde_json::json!(last));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_errors_are_distinct_category() {
        let gone = Error::EntityNotFound {
            entity_id: "Human1".to_string(),
        };
        let down = Error::StoreUnavailable("lock poisoned".to_string());
        assert_eq!(gone.category(), ErrorCategory::Host);
        assert_eq!(down.category(), ErrorCategory::Host);
        assert!(!gone.is_recoverable());
        assert!(down.is_recoverable());
    }

    #[test]
    fn test_codes_are_grouped() {
        let cut = Error::InvalidCutTable {
            domain: "food".to_string(),
            reason: "x".to_string(),
        };
        assert_eq!(cut.code(), 11);
        assert_eq!(cut.category(), ErrorCategory::Config);
        assert_eq!(Error::NonFiniteValue { field: "x".into() }.code(), 21);
    }

    #[test]
    fn test_structured_error_context() {
        let err = Error::EntityNotFound {
            entity_id: "Human7".to_string(),
        };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 30);
        assert_eq!(structured.context["entity_id"], "Human7");

        let json = structured.to_json();
        assert!(json.contains("\"category\":\"host\""));
    }
}
