//! Server lifecycle supervisor.
//!
//! The supervisor owns the pid record. It refuses to start over a live
//! server, records the pids of what it started, and stops a server top-down:
//! the manager in process-managed topology, the primary otherwise.
//!
//! Key design decisions:
//! - **Record follows reality**: the record is cleared only once the
//!   processes are confirmed gone; a timed-out stop leaves it in place
//! - **Detach before start**: daemonizing happens before the runtime
//!   spawns threads or binds sockets
//! - **Sync API**: no async runtime exists when `start` is called

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use harbor_core::{
    ControlSignal, PidRecord, ProcessControl, ProcessControlError, RuntimeHandle, ServerRuntime,
    ServerStatus, ServerTopologyMode, SupervisorError,
};
use tracing::{debug, info, warn};

use crate::liveness::LivenessChecker;
use crate::pidfile::PidStore;

/// Interval between liveness probes while stopping.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle state as seen by this supervisor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Starts, stops, reloads and reports on a harbor server.
pub struct ProcessSupervisor<R> {
    store: PidStore,
    control: Arc<dyn ProcessControl>,
    liveness: LivenessChecker,
    runtime: R,
    poll_interval: Duration,
    state: Mutex<SupervisorState>,
}

impl<R> ProcessSupervisor<R> {
    pub fn new(store: PidStore, control: Arc<dyn ProcessControl>, runtime: R) -> Self {
        Self {
            store,
            liveness: LivenessChecker::new(Arc::clone(&control)),
            control,
            runtime,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: Mutex::new(SupervisorState::Stopped),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub const fn store(&self) -> &PidStore {
        &self.store
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: SupervisorState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*state, to = ?next, "supervisor state");
        *state = next;
    }

    /// Read-only status; never touches the record.
    pub fn status(&self) -> ServerStatus {
        let record = self.store.read();
        if self.liveness.is_running(&record) {
            ServerStatus::Running(record)
        } else {
            ServerStatus::NotRunning
        }
    }

    /// Gracefully stop the recorded server, waiting up to `timeout`.
    ///
    /// Returns the record that was cleared. On timeout the record is left
    /// intact.
    pub fn stop(&self, timeout: Duration) -> Result<PidRecord, SupervisorError> {
        let record = self.store.read();
        if !self.liveness.is_running(&record) {
            return Err(SupervisorError::NotRunning);
        }
        let target = record.signal_target().ok_or(SupervisorError::NotRunning)?;

        self.transition(SupervisorState::Stopping);
        info!(%target, %record, "stopping server");
        match self.control.send(target, ControlSignal::Terminate) {
            // Exited between the probe and the signal.
            Ok(()) | Err(ProcessControlError::NoSuchProcess(_)) => {}
            Err(e) => {
                self.transition(SupervisorState::Running);
                return Err(SupervisorError::Signal(e));
            }
        }

        let started = Instant::now();
        loop {
            if !self.liveness.is_running(&record) {
                self.store.clear()?;
                self.transition(SupervisorState::Stopped);
                info!(%record, waited = ?started.elapsed(), "server stopped");
                return Ok(record);
            }

            let waited = started.elapsed();
            if waited >= timeout {
                self.transition(SupervisorState::Running);
                warn!(%target, ?waited, "server still alive after timeout");
                return Err(SupervisorError::Timeout {
                    pid: target,
                    waited,
                });
            }

            thread::sleep(self.poll_interval.min(timeout - waited));
        }
    }

    /// Ask the manager for a rolling restart of its workers.
    pub fn reload(&self) -> Result<PidRecord, SupervisorError> {
        let record = self.store.read();
        if !self.liveness.is_running(&record) {
            return Err(SupervisorError::NotRunning);
        }
        let Some(manager) = record.manager else {
            return Err(SupervisorError::ReloadUnsupported);
        };

        info!(%manager, "requesting worker reload");
        self.control
            .send(manager, ControlSignal::Reload)
            .map_err(SupervisorError::Signal)?;
        Ok(record)
    }
}

impl<R: ServerRuntime> ProcessSupervisor<R> {
    /// Start the server in `topology`, detaching first when `daemonize` is
    /// set. Returns once the runtime is ready and the pids are recorded.
    pub fn start(
        &self,
        topology: ServerTopologyMode,
        daemonize: bool,
    ) -> Result<StartedServer, SupervisorError> {
        let existing = self.store.read();
        if self.liveness.is_running(&existing) {
            return Err(SupervisorError::AlreadyRunning(existing));
        }
        if !existing.is_empty() {
            info!(record = %existing, "replacing stale pid record");
        }

        self.transition(SupervisorState::Starting);

        if daemonize {
            if let Err(e) = self.control.detach() {
                self.transition(SupervisorState::Stopped);
                return Err(SupervisorError::Detach(e));
            }
        }

        let handle = match self.runtime.start(topology) {
            Ok(handle) => handle,
            Err(e) => {
                self.transition(SupervisorState::Stopped);
                return Err(e.into());
            }
        };

        let record = handle.pids();
        if let Err(e) = self.store.write(&record) {
            // Without a record nobody could stop a detached manager later.
            if let Some(manager) = record.manager {
                let _ = self.control.send(manager, ControlSignal::Terminate);
            }
            self.transition(SupervisorState::Stopped);
            return Err(e.into());
        }

        self.transition(SupervisorState::Running);
        info!(%topology, %record, address = %handle.address(), "server started");

        Ok(StartedServer {
            record,
            handle,
            store: self.store.clone(),
        })
    }
}

/// A server started by [`ProcessSupervisor::start`].
#[derive(Debug)]
pub struct StartedServer {
    record: PidRecord,
    handle: RuntimeHandle,
    store: PidStore,
}

impl StartedServer {
    pub const fn record(&self) -> PidRecord {
        self.record
    }

    pub const fn address(&self) -> SocketAddr {
        self.handle.address()
    }

    /// Block until the server exits, then clear the record if it still
    /// names this server.
    pub fn wait(self) -> Result<(), SupervisorError> {
        let result = self.handle.wait();

        if self.store.read() == self.record {
            self.store.clear()?;
        } else {
            debug!("pid record changed while serving; leaving it");
        }

        result.map_err(SupervisorError::from)
    }
}
