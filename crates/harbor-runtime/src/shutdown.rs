//! Child shutdown and termination-signal plumbing for the server roles.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use tokio::process::Child;
use tokio::signal::unix::{SignalKind, signal as unix_signal};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Stop a child with SIGTERM, escalating to SIGKILL after `grace`.
///
/// Always reaps the child so no zombie is left behind.
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        // Already reaped by an earlier wait.
        return child.wait().await;
    };
    let target = i32::try_from(pid)
        .map(nix::unistd::Pid::from_raw)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

    match signal::kill(target, Signal::SIGTERM) {
        Ok(()) => {}
        Err(Errno::ESRCH) => return child.wait().await,
        Err(e) => return Err(io::Error::other(e)),
    }

    if let Ok(status) = timeout(grace, child.wait()).await {
        debug!(pid, "child exited after SIGTERM");
        return status;
    }

    warn!(pid, ?grace, "child ignored SIGTERM; killing");
    child.kill().await?;
    child.wait().await
}

/// Stream of termination requests: SIGTERM or SIGINT.
pub struct TerminationSignals {
    term: tokio::signal::unix::Signal,
    int: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    /// Must be called inside a tokio runtime.
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            term: unix_signal(SignalKind::terminate())?,
            int: unix_signal(SignalKind::interrupt())?,
        })
    }

    /// Resolves on the next SIGTERM or SIGINT, naming the signal.
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.term.recv() => "SIGTERM",
            _ = self.int.recv() => "SIGINT",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tokio::process::Command;

    use super::*;

    #[tokio::test]
    async fn sigterm_is_enough_for_cooperative_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let started = Instant::now();
        let status = shutdown_child(&mut child, Duration::from_secs(5)).await.unwrap();
        assert!(!status.success());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn stubborn_child_is_killed_after_grace() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; sleep 30"])
            .spawn()
            .unwrap();
        // Let the shell install its trap.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let status = shutdown_child(&mut child, Duration::from_millis(200))
            .await
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn already_exited_child_is_reaped() {
        let mut child = Command::new("true").spawn().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = shutdown_child(&mut child, Duration::from_secs(1)).await.unwrap();
        assert!(status.success());
    }
}
