// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `depgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "depgraph",
    version,
    about = "Evaluate a sample statistics dependency graph, eagerly or lazily.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to an engine config file (TOML).
    ///
    /// If omitted, `Depgraph.toml` is used when it exists, otherwise defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Number of samples fed into the graph as `xs`.
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub size: usize,

    /// Evaluate lazily and only read `stddev`.
    #[arg(long)]
    pub lazy: bool,

    /// Drop the initial values from the printed results.
    #[arg(long)]
    pub hide_initials: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEPGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the evaluation order, but don't compute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
