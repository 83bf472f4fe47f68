//! Exit codes for the cw-core CLI.
//!
//! Ranges:
//! - 0-2: outcome of the check (parse the code, not the output)
//! - 10-19: user/environment errors
//! - 20-29: internal errors

use cw_common::{Band, Error, ErrorCategory};

/// Stable exit codes for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Nothing worse than stable.
    Clean = 0,

    /// At least one subsystem needs attention.
    Warnings = 1,

    /// At least one subsystem is critical.
    Critical = 2,

    /// Invalid arguments or fixture contents.
    ArgsError = 10,

    /// Configuration could not be loaded or an adapter could not be built.
    ConfigError = 11,

    /// The snapshot store or floor lookup failed.
    HostError = 12,

    /// Internal error (bug).
    InternalError = 20,

    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0-2 all mean the command ran to completion.
    pub fn is_success(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::Warnings => "OK_WARNINGS",
            ExitCode::Critical => "OK_CRITICAL",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::HostError => "ERR_HOST",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Outcome code for the worst band a command reported.
    pub fn from_band(band: Band) -> ExitCode {
        match band {
            Band::Critical => ExitCode::Critical,
            Band::High | Band::Warning | Band::Medium | Band::Low => ExitCode::Warnings,
            Band::Stable | Band::Healthy => ExitCode::Clean,
        }
    }

    /// Exit code for an engine error.
    pub fn from_error(err: &Error) -> ExitCode {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Input => ExitCode::ArgsError,
            ErrorCategory::Host => ExitCode::HostError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
