//! Worker role: one of several processes sharing the listen address.

use std::time::Duration;

use harbor_core::{RuntimeError, ServerConfig};
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{cancel_on_signal, serve_until};
use crate::control::{parent_pid, set_process_title};
use crate::shutdown::TerminationSignals;

const ORPHAN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Entry point of `harbor worker`.
pub fn run_worker() -> Result<(), RuntimeError> {
    let config = ServerConfig::from_runtime_env()?;
    set_process_title(&format!("{}-worker", config.process_name));

    let address = config.socket_addr()?;
    let app = harbor_axum::router(&config)?;
    let runtime = Builder::new_multi_thread().enable_all().build()?;

    let result = runtime.block_on(async move {
        let listener = harbor_axum::listener::bind(address, true).map_err(|source| {
            RuntimeError::Bind {
                address: address.to_string(),
                source,
            }
        })?;
        info!(%address, "worker listening");

        let shutdown = CancellationToken::new();
        cancel_on_signal(TerminationSignals::install()?, shutdown.clone());
        exit_when_orphaned(shutdown.clone());

        serve_until(listener, app, shutdown, config.shutdown_timeout).await
    });
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

/// A worker whose manager died would otherwise serve forever.
fn exit_when_orphaned(shutdown: CancellationToken) {
    let parent = parent_pid();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(ORPHAN_CHECK_INTERVAL);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => return,
                _ = tick.tick() => {
                    if parent_pid() != parent {
                        warn!(parent, "manager gone; shutting down");
                        shutdown.cancel();
                        return;
                    }
                }
            }
        }
    });
}
