//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Environment variable behind `--log-file`; also handed to manager and
/// worker processes.
pub const LOG_FILE_ENV: &str = "HARBOR_LOG_FILE";
/// Environment variable behind `--verbose`.
pub const VERBOSE_ENV: &str = "HARBOR_VERBOSE";

/// Command-line interface of the harbor HTTP server.
#[derive(Debug, Parser)]
#[command(name = "harbor")]
#[command(about = "Run and control a harbor HTTP server")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true, env = VERBOSE_ENV)]
    pub verbose: bool,

    /// Append logs to this file instead of standard error
    #[arg(long = "log-file", global = true, env = LOG_FILE_ENV)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
