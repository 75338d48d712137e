//! Subcommands and their arguments.
//!
//! Values that need domain validation (port, mode) are taken as strings
//! and checked by `harbor-core`, so a bad value is a configuration error
//! with the same message everywhere.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the server
    Start(StartArgs),

    /// Stop a running server
    Stop {
        #[command(flatten)]
        pid_file: PidFileArg,

        /// Seconds to wait for the server to exit
        #[arg(long, default_value_t = 10, env = "HARBOR_STOP_TIMEOUT")]
        timeout: u64,
    },

    /// Report whether a server is running
    Status(PidFileArg),

    /// Restart the workers of a process-managed server one by one
    Reload(PidFileArg),

    /// Internal: manager process of the process-managed topology
    #[command(hide = true)]
    Manager,

    /// Internal: worker process of the process-managed topology
    #[command(hide = true)]
    Worker,
}

/// Location of the pid record.
#[derive(Debug, Clone, Args)]
pub struct PidFileArg {
    /// Pid file [default: <data dir>/harbor.pid]
    #[arg(long = "pid-file", env = "HARBOR_PID_FILE")]
    pub path: Option<PathBuf>,
}

impl PidFileArg {
    pub fn resolve(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(harbor_core::paths::default_pid_file)
    }
}

/// Options of `harbor start`.
#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1", env = "HARBOR_HOST")]
    pub host: String,

    /// Port to listen on (1-65535)
    #[arg(
        short,
        long,
        default_value = "8080",
        env = "HARBOR_PORT",
        allow_hyphen_values = true
    )]
    pub port: String,

    /// Server mode: single-process or process-managed
    #[arg(long = "mode", default_value = "single-process", env = "HARBOR_MODE")]
    pub mode: String,

    /// Worker processes in process-managed mode [default: CPU count]
    #[arg(short, long, env = "HARBOR_WORKERS")]
    pub workers: Option<usize>,

    #[command(flatten)]
    pub pid_file: PidFileArg,

    /// Prefix for process titles
    #[arg(long, default_value = "harbor", env = "HARBOR_PROCESS_NAME")]
    pub process_name: String,

    /// Detach from the terminal and run in the background
    #[arg(short, long, env = "HARBOR_DAEMONIZE")]
    pub daemonize: bool,

    /// Seconds in-flight requests get when shutting down
    #[arg(long, default_value_t = 10, env = "HARBOR_SHUTDOWN_TIMEOUT")]
    pub shutdown_timeout: u64,

    #[command(flatten)]
    pub static_files: StaticArgs,
}

/// Static file options. Serving is enabled by `--static-root`.
#[derive(Debug, Clone, Args)]
pub struct StaticArgs {
    /// Serve static files from this directory
    #[arg(long = "static-root", env = "HARBOR_STATIC_ROOT")]
    pub root: Option<PathBuf>,

    /// Return 404 for missing files instead of passing to the application
    #[arg(long = "no-fallthrough")]
    pub no_fallthrough: bool,

    /// Disable on-the-fly gzip/deflate
    #[arg(long = "no-compression")]
    pub no_compression: bool,

    /// Compression level (0-9)
    #[arg(long = "compression-level")]
    pub compression_level: Option<u32>,

    /// Cache-Control for paths matching no rule
    #[arg(long = "default-cache-control")]
    pub default_cache_control: Option<String>,

    /// Cache-Control rule as REGEX=DIRECTIVES; first match wins
    #[arg(long = "cache-control", value_name = "REGEX=DIRECTIVES")]
    pub cache_control: Vec<String>,

    /// Only serve these extensions (repeatable)
    #[arg(long = "allow-extension", value_name = "EXT")]
    pub allowed_extensions: Vec<String>,

    /// Maximum ranges honoured in one request
    #[arg(long = "max-ranges")]
    pub max_ranges: Option<usize>,
}
