// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `childpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "childpipe",
    version,
    about = "Run a program with piped stdin/stdout/stderr and exit with its exit code.",
    long_about = None
)]
pub struct CliArgs {
    /// Launch configuration file (TOML) with `[io]` and `[poll]` sections.
    ///
    /// If omitted, built-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CHILDPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Environment variable for the child. Repeatable.
    ///
    /// The child starts with an empty environment unless `--inherit-env` is
    /// given.
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Copy this process's environment into the child before applying
    /// `--env`.
    #[arg(long)]
    pub inherit_env: bool,

    /// Resolve PROGRAM as a file name inside this directory.
    #[arg(long, value_name = "DIR")]
    pub find_in: Option<PathBuf>,

    /// Forward everything read from this process's stdin to the child.
    #[arg(long)]
    pub feed_stdin: bool,

    /// Stop waiting after this many seconds and exit with code 124.
    ///
    /// The child itself is left running.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Program to run: a path, or a file name with `--find-in`. There is no
    /// `PATH` lookup and no shell.
    #[arg(value_name = "PROGRAM")]
    pub program: String,

    /// Arguments passed to PROGRAM.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
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

/// Parse `KEY=VALUE`. The key must be non-empty; the value may contain `=`.
pub fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid environment entry '{s}' (expected KEY=VALUE)")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
