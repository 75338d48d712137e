//! Manager role: keeps `worker_count` workers alive.
//!
//! - SIGTERM/SIGINT: stop every worker (SIGTERM, SIGKILL after the grace
//!   period) and exit
//! - SIGUSR1: rolling restart, one worker at a time, replacement first
//! - a worker that dies on its own is replaced on the next sweep
//! - the primary going away stops every worker, as SIGTERM does

use std::time::Duration;

use harbor_core::{RuntimeError, ServerConfig};
use tokio::process::Child;
use tokio::runtime::Builder;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};

use super::launch::{Role, RoleLauncher};
use crate::control::{parent_pid, set_process_title};
use crate::shutdown::{TerminationSignals, shutdown_child};

/// How often dead workers are looked for.
const SWEEP_INTERVAL: Duration = Duration::from_millis(500);
const ORPHAN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Entry point of `harbor manager`.
pub fn run_manager() -> Result<(), RuntimeError> {
    let config = ServerConfig::from_runtime_env()?;
    set_process_title(&format!("{}-manager", config.process_name));

    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(manage(config))
}

struct Pool {
    launcher: RoleLauncher,
    config: ServerConfig,
    workers: Vec<Child>,
}

impl Pool {
    fn spawn_worker(&self) -> Result<Child, RuntimeError> {
        self.launcher.spawn(Role::Worker, &self.config)
    }

    fn fill(&mut self) -> Result<(), RuntimeError> {
        while self.workers.len() < self.config.worker_count {
            let worker = self.spawn_worker()?;
            self.workers.push(worker);
        }
        Ok(())
    }

    /// Replace workers that exited without being asked to.
    fn replace_dead(&mut self) {
        for slot in &mut self.workers {
            let exited = match slot.try_wait() {
                Ok(Some(status)) => status.to_string(),
                Ok(None) => continue,
                Err(e) => e.to_string(),
            };
            warn!(status = %exited, "worker died; restarting");
            match self.launcher.spawn(Role::Worker, &self.config) {
                Ok(replacement) => *slot = replacement,
                Err(e) => error!(error = %e, "failed to restart worker"),
            }
        }
    }

    async fn rolling_restart(&mut self) {
        info!(workers = self.workers.len(), "rolling restart");
        let grace = self.config.shutdown_timeout;
        for index in 0..self.workers.len() {
            let replacement = match self.spawn_worker() {
                Ok(child) => child,
                Err(e) => {
                    error!(error = %e, "rolling restart aborted");
                    return;
                }
            };
            let mut old = std::mem::replace(&mut self.workers[index], replacement);
            if let Err(e) = shutdown_child(&mut old, grace).await {
                warn!(error = %e, "failed to stop old worker");
            }
        }
        info!("rolling restart complete");
    }

    async fn shutdown(&mut self) {
        let grace = self.config.shutdown_timeout;
        let stops = self
            .workers
            .iter_mut()
            .map(|worker| shutdown_child(worker, grace));
        for result in futures_util::future::join_all(stops).await {
            if let Err(e) = result {
                warn!(error = %e, "failed to stop worker");
            }
        }
        self.workers.clear();
    }
}

async fn manage(config: ServerConfig) -> Result<(), RuntimeError> {
    let parent = parent_pid();
    let mut terminate = TerminationSignals::install()?;
    let mut reload = signal(SignalKind::user_defined1())?;

    let mut pool = Pool {
        launcher: RoleLauncher::current_exe()?,
        workers: Vec::with_capacity(config.worker_count),
        config,
    };
    if let Err(e) = pool.fill() {
        pool.shutdown().await;
        return Err(e);
    }
    info!(workers = pool.workers.len(), "workers started");

    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
    let mut orphan_check = tokio::time::interval(ORPHAN_CHECK_INTERVAL);
    loop {
        tokio::select! {
            signal = terminate.recv() => {
                info!(signal, "stopping workers");
                pool.shutdown().await;
                return Ok(());
            }
            _ = reload.recv() => pool.rolling_restart().await,
            _ = sweep.tick() => pool.replace_dead(),
            _ = orphan_check.tick() => {
                if parent_pid() != parent {
                    warn!(parent, "primary gone; stopping workers");
                    pool.shutdown().await;
                    return Ok(());
                }
            }
        }
    }
}
