//! Error types for the `rulematch` command.
//!
//! Configuration problems map to exit status 2 through [`exit_status`].
//! Everything else is a runtime failure.

use std::io;

use rulematch::RuleSetError;
use thiserror::Error;

/// Errors raised while configuring or running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input file or standard input could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path as given on the command line, `-` for standard input.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// An input exceeded the configured size limit.
    #[error("{path} exceeds the {limit} byte document limit")]
    DocumentTooLarge {
        /// Path as given on the command line, `-` for standard input.
        path: String,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// A rule set file was rejected.
    #[error("rule set {path} is invalid: {source}")]
    Rules {
        /// Path of the rule set file.
        path: String,
        /// Reason the rule set was rejected.
        #[source]
        source: RuleSetError,
    },
}

impl CliError {
    /// Whether the error stems from configuration rather than input.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}

/// Process exit status for a failed run: 2 for configuration errors, 1 for
/// everything else.
#[must_use]
pub fn exit_status(report: &eyre::Report) -> u8 {
    if report
        .downcast_ref::<CliError>()
        .is_some_and(CliError::is_config)
    {
        2
    } else {
        1
    }
}
