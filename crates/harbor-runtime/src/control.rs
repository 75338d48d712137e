//! [`ProcessControl`] on top of Unix signals.

use harbor_core::{ControlSignal, Pid, ProcessControl, ProcessControlError};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd;
use tracing::{debug, warn};

/// Signals via `kill(2)`, detaches via `daemon(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalProcessControl;

impl SignalProcessControl {
    pub const fn new() -> Self {
        Self
    }
}

/// Convert to the nix pid type. Pids above `i32::MAX` cannot exist on Unix,
/// and a negative value would address a process group.
pub(crate) fn nix_pid(pid: Pid) -> Option<unistd::Pid> {
    i32::try_from(pid.get()).ok().map(unistd::Pid::from_raw)
}

const fn to_signal(signal: ControlSignal) -> Signal {
    match signal {
        ControlSignal::Terminate => Signal::SIGTERM,
        ControlSignal::Reload => Signal::SIGUSR1,
        ControlSignal::Kill => Signal::SIGKILL,
    }
}

impl ProcessControl for SignalProcessControl {
    fn is_alive(&self, pid: Pid) -> bool {
        let Some(target) = nix_pid(pid) else {
            return false;
        };
        match signal::kill(target, None) {
            Ok(()) => true,
            Err(Errno::ESRCH) => false,
            // EPERM: exists but belongs to someone else
            Err(_) => true,
        }
    }

    fn send(&self, pid: Pid, signal: ControlSignal) -> Result<(), ProcessControlError> {
        let target = nix_pid(pid).ok_or(ProcessControlError::NoSuchProcess(pid))?;
        debug!(%pid, %signal, "sending signal");
        signal::kill(target, to_signal(signal)).map_err(|e| match e {
            Errno::ESRCH => ProcessControlError::NoSuchProcess(pid),
            Errno::EPERM => ProcessControlError::PermissionDenied(pid),
            other => ProcessControlError::Signal {
                pid,
                reason: other.desc().to_string(),
            },
        })
    }

    #[cfg(not(target_vendor = "apple"))]
    fn detach(&self) -> Result<(), ProcessControlError> {
        unistd::daemon(true, false).map_err(|e| ProcessControlError::Detach(e.desc().to_string()))
    }

    #[cfg(target_vendor = "apple")]
    fn detach(&self) -> Result<(), ProcessControlError> {
        Err(ProcessControlError::Detach(
            "daemon(3) is unavailable on this platform; use a service manager".to_string(),
        ))
    }
}

/// Best-effort process title, visible in `ps` and `top` on Linux.
pub fn set_process_title(title: &str) {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        // The kernel truncates to 15 bytes.
        let truncated: String = title.chars().take(15).collect();
        match std::ffi::CString::new(truncated) {
            Ok(name) => {
                if let Err(e) = nix::sys::prctl::set_name(&name) {
                    warn!(title, error = %e, "failed to set process title");
                }
            }
            Err(e) => warn!(title, error = %e, "invalid process title"),
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        debug!(title, "process titles unsupported on this platform");
    }
}

/// Parent process id; the manager and workers poll it to notice they were orphaned.
pub fn parent_pid() -> u32 {
    u32::try_from(unistd::getppid().as_raw()).unwrap_or(0)
}
