//! Colony Watch common types and errors.
//!
//! This crate provides the vocabulary shared by the config loader and the
//! forecasting engine:
//! - Series keys and raw snapshots
//! - The global severity band order
//! - Time basis conversion between store ticks and reporting units
//! - Common error types
//! - Output format specifications

pub mod band;
pub mod error;
pub mod id;
pub mod output;
pub mod series;

pub use band::{Band, Comparison, CutEntry};
pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::SeriesKey;
pub use output::OutputFormat;
pub use series::{Lookback, ModelKind, Snapshot, TimeBasis, TICKS_PER_DAY, TICKS_PER_HOUR};

/// Schema version stamped on every produced report.
pub const SCHEMA_VERSION: &str = "1.0.0";
