//! Single-process topology: the primary serves requests itself.

use std::time::Duration;

use harbor_core::{Pid, PidRecord, RuntimeError, RuntimeHandle, ServerConfig};
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{cancel_on_signal, serve_until};
use crate::control::set_process_title;
use crate::shutdown::TerminationSignals;

pub(super) fn start(
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> Result<RuntimeHandle, RuntimeError> {
    let address = config.socket_addr()?;
    let app = harbor_axum::router(config)?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name(format!("{}-http", config.process_name))
        .build()?;

    let (listener, signals) = {
        let _guard = runtime.enter();
        let listener = harbor_axum::listener::bind(address, false).map_err(|source| {
            RuntimeError::Bind {
                address: address.to_string(),
                source,
            }
        })?;
        (listener, TerminationSignals::install()?)
    };
    let local = listener.local_addr()?;

    set_process_title(&format!("{}-master", config.process_name));
    info!(address = %local, "listening");

    let grace = config.shutdown_timeout;
    let waiter = move || {
        let result = runtime.block_on(async move {
            cancel_on_signal(signals, shutdown.clone());
            serve_until(listener, app, shutdown, grace).await
        });
        runtime.shutdown_timeout(Duration::from_secs(1));
        result
    };

    Ok(RuntimeHandle::new(
        PidRecord::single(Pid::current()),
        local,
        waiter,
    ))
}
