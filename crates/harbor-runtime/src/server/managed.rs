//! Process-managed topology, primary side.
//!
//! The primary spawns the manager, waits until the listen address accepts
//! connections, and then only relays SIGTERM/SIGINT to the manager.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

use harbor_core::{
    Pid, PidRecord, RuntimeError, RuntimeHandle, ServerConfig, ServerTopologyMode,
};
use tokio::net::TcpStream;
use tokio::process::Child;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::launch::{Role, RoleLauncher};
use crate::control::set_process_title;
use crate::shutdown::{TerminationSignals, shutdown_child};

/// How long the manager and its workers get to start listening.
const READY_TIMEOUT: Duration = Duration::from_secs(15);
const READY_POLL: Duration = Duration::from_millis(50);

pub(super) fn start(
    config: &ServerConfig,
    launcher: &RoleLauncher,
    shutdown: CancellationToken,
) -> Result<RuntimeHandle, RuntimeError> {
    config.validate()?;
    let address = config.socket_addr()?;
    ensure_port_free(address)?;

    let mut child_config = config.clone();
    child_config.topology = ServerTopologyMode::ProcessManaged;

    let runtime = Builder::new_current_thread().enable_all().build()?;
    let grace = config.shutdown_timeout;

    let (mut manager, signals) = {
        let _guard = runtime.enter();
        (
            launcher.spawn(Role::Manager, &child_config)?,
            TerminationSignals::install()?,
        )
    };

    let Some(manager_pid) = manager.id().and_then(Pid::new) else {
        return Err(RuntimeError::ChildExited {
            role: Role::Manager.as_str(),
            status: "exited before it could be recorded".to_string(),
        });
    };

    if let Err(e) = runtime.block_on(wait_until_ready(&mut manager, address)) {
        runtime.block_on(async {
            if let Err(stop_err) = shutdown_child(&mut manager, grace).await {
                warn!(error = %stop_err, "failed to stop manager after failed start");
            }
        });
        return Err(e);
    }

    set_process_title(&format!("{}-master", config.process_name));
    info!(%address, manager = %manager_pid, workers = config.worker_count, "listening");

    let waiter = move || supervise_manager(&runtime, manager, signals, shutdown, grace);
    Ok(RuntimeHandle::new(
        PidRecord::managed(Pid::current(), manager_pid),
        address,
        waiter,
    ))
}

/// Fail fast with a bind error instead of a readiness timeout.
fn ensure_port_free(address: SocketAddr) -> Result<(), RuntimeError> {
    std::net::TcpListener::bind(address)
        .map(drop)
        .map_err(|source| RuntimeError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Wildcard addresses are not connectable; probe loopback instead.
fn probe_address(address: SocketAddr) -> SocketAddr {
    match address.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), address.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), address.port())
        }
        _ => address,
    }
}

async fn wait_until_ready(manager: &mut Child, address: SocketAddr) -> Result<(), RuntimeError> {
    let probe = probe_address(address);
    let started = Instant::now();

    loop {
        if let Some(status) = manager.try_wait()? {
            return Err(RuntimeError::ChildExited {
                role: Role::Manager.as_str(),
                status: status.to_string(),
            });
        }

        if TcpStream::connect(probe).await.is_ok() {
            return Ok(());
        }

        let waited = started.elapsed();
        if waited >= READY_TIMEOUT {
            return Err(RuntimeError::NotReady {
                address: address.to_string(),
                waited,
            });
        }

        tokio::time::sleep(READY_POLL).await;
    }
}

fn supervise_manager(
    runtime: &Runtime,
    mut manager: Child,
    mut signals: TerminationSignals,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), RuntimeError> {
    runtime.block_on(async move {
        tokio::select! {
            status = manager.wait() => {
                let status = status?;
                if status.success() {
                    info!("manager exited");
                    Ok(())
                } else {
                    Err(RuntimeError::ChildExited {
                        role: Role::Manager.as_str(),
                        status: status.to_string(),
                    })
                }
            }
            signal = signals.recv() => {
                info!(signal, "forwarding shutdown to manager");
                stop_manager(&mut manager, grace).await
            }
            () = shutdown.cancelled() => stop_manager(&mut manager, grace).await,
        }
    })
}

/// The manager needs `grace` for its workers; give it that much again for
/// itself before killing it.
async fn stop_manager(manager: &mut Child, grace: Duration) -> Result<(), RuntimeError> {
    let status = shutdown_child(manager, grace.saturating_mul(2)).await?;
    info!(%status, "manager stopped");
    Ok(())
}
