//! Logging configuration for the colony-watch CLI.
//!
//! Level comes from, highest precedence first: `-v`/`-q`, `CW_LOG`, then a
//! coarse reading of `RUST_LOG`. Format comes from `--log-format`, then
//! `CW_LOG_FORMAT`. Output shape (timestamps, file/line) follows the level
//! rather than separate switches.

use serde::{Deserialize, Serialize};

pub const ENV_LOG_LEVEL: &str = "CW_LOG";
pub const ENV_LOG_FORMAT: &str = "CW_LOG_FORMAT";

/// Crates whose events pass the default filter.
const LOG_TARGETS: [&str; 3] = ["cw_core", "cw_config", "cw_common"];

/// Shape of stderr log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event, for piping next to a JSON report.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            _ => Err(format!("log format must be human or jsonl, got '{}'", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stderr verbosity. Reports go to stdout regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    /// Config fallbacks and skipped series.
    #[default]
    Warn,
    /// One line per command stage.
    Info,
    /// One line per assessed series.
    Debug,
    Trace,
}

impl LogLevel {
    /// Most verbose first, for scanning `RUST_LOG`.
    const BY_VERBOSITY: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// `-v` steps up from `warn`; `-q` wins over any `-v`.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<LogLevel> {
        if quiet {
            return Some(LogLevel::Error);
        }
        match verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    /// Most verbose level named anywhere in a `RUST_LOG` directive.
    fn from_directive(directive: &str) -> Option<LogLevel> {
        let directive = directive.to_ascii_lowercase();
        Self::BY_VERBOSITY
            .into_iter()
            .find(|level| directive.contains(level.as_str()))
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower == "warning" {
            return Ok(LogLevel::Warn);
        }
        [LogLevel::Off]
            .into_iter()
            .chain(Self::BY_VERBOSITY)
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogConfig {
    /// Resolve from the environment, letting CLI values win.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        let env_level = match std::env::var(ENV_LOG_LEVEL) {
            Ok(val) => val.parse().ok(),
            Err(_) => std::env::var("RUST_LOG")
                .ok()
                .and_then(|val| LogLevel::from_directive(&val)),
        };
        let env_format = std::env::var(ENV_LOG_FORMAT)
            .ok()
            .and_then(|val| val.parse().ok());

        LogConfig {
            level: cli_level.or(env_level).unwrap_or_default(),
            format: cli_format.or(env_format).unwrap_or_default(),
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Human lines carry a timestamp only once per-series events show up.
    pub fn timestamps(&self) -> bool {
        self.format == LogFormat::Jsonl || self.level >= LogLevel::Debug
    }

    pub fn source_location(&self) -> bool {
        self.level == LogLevel::Trace
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn directive(&self) -> String {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(err.contains("human or jsonl"));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("off".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(LogLevel::from_verbosity(0, false), None);
        assert_eq!(LogLevel::from_verbosity(1, false), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_verbosity(2, false), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_verbosity(5, false), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_verbosity(3, true), Some(LogLevel::Error));
    }

    #[test]
    fn test_rust_log_picks_most_verbose() {
        assert_eq!(
            LogLevel::from_directive("cw_core=info,hyper=TRACE"),
            Some(LogLevel::Trace)
        );
        assert_eq!(LogLevel::from_directive("cw_config=warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_directive("cw_core"), None);
    }

    #[test]
    fn test_output_shape_follows_level() {
        let quiet = LogConfig::default();
        assert!(!quiet.timestamps());
        assert!(!quiet.source_location());

        let trace = LogConfig::default().with_level(LogLevel::Trace);
        assert!(trace.timestamps());
        assert!(trace.source_location());

        let jsonl = LogConfig {
            format: LogFormat::Jsonl,
            level: LogLevel::Warn,
        };
        assert!(jsonl.timestamps());
    }

    #[test]
    fn test_directive_covers_workspace_crates() {
        let config = LogConfig::default().with_level(LogLevel::Debug);
        assert_eq!(
            config.directive(),
            "cw_core=debug,cw_config=debug,cw_common=debug"
        );
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = LogConfig::from_env(Some(LogLevel::Trace), Some(LogFormat::Jsonl));
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Jsonl);
    }
}
