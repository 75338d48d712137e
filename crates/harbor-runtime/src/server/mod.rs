//! The HTTP server runtime.
//!
//! Two topologies behind one [`ServerRuntime`] implementation:
//!
//! ```text
//! single-process     primary ── tokio runtime ── axum router
//!
//! process-managed    primary ── manager ──┬── worker (SO_REUSEPORT)
//!                                         ├── worker
//!                                         └── worker
//! ```
//!
//! In the managed topology the primary only relays termination signals to
//! the manager and exits with it. Manager and workers are the same binary,
//! re-executed with a role subcommand and the configuration in
//! [`RUNTIME_CONFIG_ENV`](harbor_core::config::RUNTIME_CONFIG_ENV).

mod launch;
mod managed;
mod manager;
mod single;
mod worker;

use std::time::Duration;

use axum::Router;
use harbor_core::{
    RuntimeError, RuntimeHandle, ServerConfig, ServerRuntime, ServerTopologyMode,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use launch::{Role, RoleLauncher};
pub use manager::run_manager;
pub use worker::run_worker;

use crate::shutdown::TerminationSignals;

/// [`ServerRuntime`] serving the harbor router over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRuntime {
    config: ServerConfig,
    launcher: Option<RoleLauncher>,
    shutdown: CancellationToken,
}

impl HttpRuntime {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            launcher: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Override how the manager process is launched. Defaults to the
    /// current executable.
    #[must_use]
    pub fn with_launcher(mut self, launcher: RoleLauncher) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Cancelling this token stops a started server as SIGTERM would.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl ServerRuntime for HttpRuntime {
    fn start(&self, topology: ServerTopologyMode) -> Result<RuntimeHandle, RuntimeError> {
        match topology {
            ServerTopologyMode::SingleProcess => single::start(&self.config, self.shutdown.clone()),
            ServerTopologyMode::ProcessManaged => {
                let launcher = match &self.launcher {
                    Some(launcher) => launcher.clone(),
                    None => RoleLauncher::current_exe()?,
                };
                managed::start(&self.config, &launcher, self.shutdown.clone())
            }
        }
    }
}

/// Cancel `shutdown` on the first SIGTERM or SIGINT.
fn cancel_on_signal(mut signals: TerminationSignals, shutdown: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            signal = signals.recv() => {
                info!(signal, "shutdown requested");
                shutdown.cancel();
            }
            () = shutdown.cancelled() => {}
        }
    });
}

/// Serve `app` until `shutdown` fires, then give open connections `grace`
/// to finish.
async fn serve_until(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), RuntimeError> {
    let serve = harbor_axum::serve(listener, app, shutdown.clone());
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => result.map_err(RuntimeError::Io),
        () = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(?grace, "connections still open after grace period; closing");
            Ok(())
        }
    }
}
