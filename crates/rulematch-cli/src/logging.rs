//! Structured logging with environment variable configuration.
//!
//! Logs go to stderr so that JSON results on stdout stay machine-readable.
//! Records emitted by the `rulematch` library through the `log` facade are
//! bridged into the same subscriber.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::CliConfig;

fn filter_from_config(config: &CliConfig) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Initialise the logging subsystem based on configuration.
///
/// Log level precedence (highest to lowest):
///
/// 1. CLI `--log-level` (parsed into `config.log_level`)
/// 2. `RULEMATCH_LOG_LEVEL` (parsed into `config.log_level`)
/// 3. Default configuration value
///
/// A second call is a no-op; the first subscriber wins.
pub fn init_logging(config: &CliConfig) {
    let filter = filter_from_config(config);

    // `try_init` also installs the `log` bridge, which `finish` would skip.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
