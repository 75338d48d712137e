//! The HTTP server runtime as seen by the supervisor.

use std::fmt;
use std::net::SocketAddr;

use super::RuntimeError;
use crate::domain::{PidRecord, ServerTopologyMode};

type Waiter = Box<dyn FnOnce() -> Result<(), RuntimeError> + Send>;

/// A started server: its process identity, where it listens, and a way to
/// block until it exits.
pub struct RuntimeHandle {
    pids: PidRecord,
    address: SocketAddr,
    waiter: Waiter,
}

impl RuntimeHandle {
    pub fn new<F>(pids: PidRecord, address: SocketAddr, waiter: F) -> Self
    where
        F: FnOnce() -> Result<(), RuntimeError> + Send + 'static,
    {
        Self {
            pids,
            address,
            waiter: Box::new(waiter),
        }
    }

    pub const fn pids(&self) -> PidRecord {
        self.pids
    }

    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    /// Block until the server stops accepting requests and exits.
    pub fn wait(self) -> Result<(), RuntimeError> {
        (self.waiter)()
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("pids", &self.pids)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Starts the HTTP server in the requested topology.
///
/// `start` returns once the server is ready to accept connections. The
/// returned handle reports the primary pid (and the manager pid for the
/// process-managed topology).
pub trait ServerRuntime {
    fn start(&self, topology: ServerTopologyMode) -> Result<RuntimeHandle, RuntimeError>;
}
