//! Command configuration parsed from environment variables.
//!
//! Every setting can be overridden from the environment with a
//! `RULEMATCH_` prefix, and from the command line with a matching flag.

use std::env;
use std::str::FromStr;

use crate::error::CliError;

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Warn` so standard error stays quiet unless something is
/// worth a rule author's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging, including per-document verdicts.
    Trace,
    /// Debug-level information such as query recovery notes.
    Debug,
    /// Progress messages.
    Info,
    /// Authoring warnings and other suspicious input.
    #[default]
    Warn,
    /// Failures only.
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(CliError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Default cap on a single document or rule file, in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 16 * 1024 * 1024;

const LOG_LEVEL_VAR: &str = "RULEMATCH_LOG_LEVEL";
const MAX_DOCUMENT_BYTES_VAR: &str = "RULEMATCH_MAX_DOCUMENT_BYTES";

/// Configuration shared by every subcommand.
///
/// # Environment Variables
///
/// - `RULEMATCH_LOG_LEVEL`: Sets the log level (trace, debug, info, warn,
///   error)
/// - `RULEMATCH_MAX_DOCUMENT_BYTES`: Largest input file accepted
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: LogLevel,
    /// Inputs larger than this are rejected instead of read.
    pub max_document_bytes: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

fn parse_byte_limit(raw: &str) -> Result<u64, CliError> {
    match raw.trim().parse::<u64>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(CliError::InvalidConfig(format!(
            "invalid document size limit '{raw}', expected a positive integer"
        ))),
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` if an environment variable contains
    /// an invalid value.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` if a variable contains an invalid
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(val) => val.parse()?,
            None => LogLevel::default(),
        };

        let max_document_bytes = match lookup(MAX_DOCUMENT_BYTES_VAR) {
            Some(val) => parse_byte_limit(&val)?,
            None => DEFAULT_MAX_DOCUMENT_BYTES,
        };

        Ok(Self {
            log_level,
            max_document_bytes,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// Command-line flags take precedence over environment-based values.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        max_document_bytes: Option<u64>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }

        if let Some(limit) = max_document_bytes {
            self.max_document_bytes = limit;
        }

        self
    }

    /// Create a new configuration with the specified log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lookup_from(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("Debug", LogLevel::Debug)]
    #[case("INFO", LogLevel::Info)]
    #[case("warn", LogLevel::Warn)]
    #[case("warning", LogLevel::Warn)]
    #[case("error", LogLevel::Error)]
    fn log_level_parses_valid_values(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().ok(), Some(expected));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let result = "loud".parse::<LogLevel>();
        assert!(result.unwrap_err().to_string().contains("unknown log level"));
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = CliConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn reads_variables_through_lookup() {
        let config = CliConfig::from_lookup(lookup_from(&[
            ("RULEMATCH_LOG_LEVEL", "debug"),
            ("RULEMATCH_MAX_DOCUMENT_BYTES", " 2048 "),
        ]))
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.max_document_bytes, 2048);
    }

    #[rstest]
    #[case("0")]
    #[case("-5")]
    #[case("lots")]
    fn rejects_invalid_byte_limits(#[case] raw: &str) {
        let err = CliConfig::from_lookup(|key| {
            (key == "RULEMATCH_MAX_DOCUMENT_BYTES").then(|| raw.to_owned())
        })
        .unwrap_err();
        assert!(err.to_string().contains("invalid document size limit"));
        assert!(err.to_string().contains(raw));
    }

    #[test]
    fn apply_overrides_updates_selected_fields() {
        let config = CliConfig::default().apply_overrides(Some(LogLevel::Error), Some(42));
        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(config.max_document_bytes, 42);

        let config = CliConfig::default().apply_overrides(None, None);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn with_log_level_builder() {
        let config = CliConfig::default().with_log_level(LogLevel::Trace);
        assert_eq!(config.log_level.as_filter_str(), "trace");
    }
}
