//! OS process-control capability.

use std::fmt;

use super::ProcessControlError;
use crate::domain::Pid;

/// Lifecycle signals the supervisor and the manager send to processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSignal {
    /// Graceful termination (SIGTERM).
    Terminate,
    /// Rolling restart of workers (SIGUSR1).
    Reload,
    /// Forced termination (SIGKILL).
    Kill,
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Terminate => "SIGTERM",
            Self::Reload => "SIGUSR1",
            Self::Kill => "SIGKILL",
        })
    }
}

/// Probe, signal and detach processes.
///
/// Implementations must keep `is_alive` free of observable side effects on
/// the probed process.
pub trait ProcessControl: Send + Sync {
    /// Zero-effect liveness probe.
    ///
    /// A process that exists but belongs to another user still counts as
    /// alive.
    fn is_alive(&self, pid: Pid) -> bool;

    /// Deliver `signal` to `pid`.
    fn send(&self, pid: Pid, signal: ControlSignal) -> Result<(), ProcessControlError>;

    /// Detach the calling process from its terminal and continue in the
    /// background with standard streams redirected.
    ///
    /// Only safe to call before any thread pool or async runtime exists.
    fn detach(&self) -> Result<(), ProcessControlError>;
}
