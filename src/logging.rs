// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (one level for everything),
//! 2. `DEPGRAPH_LOG`, read as `EnvFilter` directives, so a single layer can
//!    be raised on its own: `DEPGRAPH_LOG=warn,depgraph::exec=debug`,
//! 3. the caller's default level, when neither gives a usable directive.
//!
//! Logs go to STDERR; computed values are printed on STDOUT.

use anyhow::{Result, anyhow};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "DEPGRAPH_LOG";

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Filter for the binary and the test helpers.
///
/// Invalid directives in `DEPGRAPH_LOG` are skipped rather than failing
/// startup.
pub fn env_filter(cli_level: Option<LogLevel>, default: LevelFilter) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::default().add_directive(LevelFilter::from(level).into()),
        None => filter_from_directives(&std::env::var(LOG_ENV).unwrap_or_default(), default),
    }
}

/// Parse comma-separated directives. `default` applies only when none of
/// them parse.
pub fn filter_from_directives(directives: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .parse_lossy(directives)
}

/// Initialise the global logging subscriber.
///
/// Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(env_filter(cli_level, LevelFilter::INFO))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
