//! Start command handler.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use harbor_core::config::{CacheControlRule, StaticFilesConfig};
use harbor_core::{ConfigError, ProcessControl, ServerConfig, ServerTopologyMode, parse_port};
use harbor_runtime::{HttpRuntime, PidStore, ProcessSupervisor, RoleLauncher, SignalProcessControl};
use tracing::info;

use crate::commands::{StartArgs, StaticArgs};
use crate::parser::{LOG_FILE_ENV, VERBOSE_ENV};

/// Turn `start` options into a validated configuration.
pub fn build_config(args: &StartArgs) -> Result<ServerConfig, ConfigError> {
    let topology: ServerTopologyMode = args.mode.parse()?;
    let mut config = ServerConfig {
        host: args.host.clone(),
        port: parse_port(&args.port)?,
        topology,
        pid_file: args.pid_file.resolve(),
        process_name: args.process_name.clone(),
        shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        static_files: static_config(&args.static_files)?,
        ..ServerConfig::default()
    };
    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }
    config.validate()?;
    Ok(config)
}

fn static_config(args: &StaticArgs) -> Result<StaticFilesConfig, ConfigError> {
    let Some(root) = &args.root else {
        return Ok(StaticFilesConfig::default());
    };

    let mut config = StaticFilesConfig::serving(root);
    config.fallthrough_on_missing = !args.no_fallthrough;
    config.compression.enabled = !args.no_compression;
    if let Some(level) = args.compression_level {
        config.compression.level = level;
    }
    if let Some(directives) = &args.default_cache_control {
        config.default_cache_control.clone_from(directives);
    }
    if let Some(max) = args.max_ranges {
        config.max_ranges = max;
    }
    if !args.allowed_extensions.is_empty() {
        config.allowed_extensions = Some(
            args.allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
    }
    config.cache_control = args
        .cache_control
        .iter()
        .map(|raw| parse_cache_rule(raw))
        .collect::<Result<_, _>>()?;
    Ok(config)
}

/// `REGEX=DIRECTIVES`. Directives contain `=` themselves (`max-age=60`),
/// so the split is at the first `=` followed by a letter.
fn parse_cache_rule(raw: &str) -> Result<CacheControlRule, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidCacheRule {
        pattern: raw.to_string(),
        reason: reason.to_string(),
    };

    let split = raw
        .match_indices('=')
        .map(|(index, _)| index)
        .find(|&index| {
            let rest = &raw[index + 1..];
            rest.starts_with(|c: char| c.is_ascii_alphabetic())
        })
        .ok_or_else(|| invalid("expected REGEX=DIRECTIVES"))?;

    let (pattern, directives) = (&raw[..split], &raw[split + 1..]);
    if pattern.is_empty() || directives.trim().is_empty() {
        return Err(invalid("expected REGEX=DIRECTIVES"));
    }
    Ok(CacheControlRule::new(pattern, directives.trim()))
}

/// Execute the start command. Blocks until the server exits.
pub fn execute(args: &StartArgs, verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let config = build_config(args)?;
    let topology = config.topology;

    let mut launcher = RoleLauncher::current_exe()?;
    if let Some(path) = log_file {
        launcher = launcher.with_env(LOG_FILE_ENV, path);
    }
    if verbose {
        launcher = launcher.with_env(VERBOSE_ENV, "true");
    }

    let supervisor = ProcessSupervisor::new(
        PidStore::new(&config.pid_file),
        Arc::new(SignalProcessControl::new()) as Arc<dyn ProcessControl>,
        HttpRuntime::new(config).with_launcher(launcher),
    );

    let started = supervisor
        .start(topology, args.daemonize)
        .context("starting harbor")?;

    let record = started.record();
    println!("harbor listening on http://{} ({record})", started.address());
    info!(pid_file = %supervisor.store().path().display(), "pid record written");

    started.wait().context("serving")?;
    Ok(())
}
