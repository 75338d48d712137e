//! Liveness of a recorded server.

use std::sync::Arc;

use harbor_core::{PidRecord, ProcessControl, ServerTopologyMode};

/// Decides whether the processes in a [`PidRecord`] are alive.
///
/// - no pids: not running
/// - process-managed: primary AND manager must answer the probe; a dead
///   manager means nobody restarts workers, so the server counts as down
/// - single-process: only the primary is probed
#[derive(Clone)]
pub struct LivenessChecker {
    control: Arc<dyn ProcessControl>,
}

impl LivenessChecker {
    pub fn new(control: Arc<dyn ProcessControl>) -> Self {
        Self { control }
    }

    pub fn is_running(&self, record: &PidRecord) -> bool {
        match record.topology() {
            None => false,
            Some(ServerTopologyMode::ProcessManaged) => {
                let primary_alive = record.primary.is_some_and(|pid| self.control.is_alive(pid));
                primary_alive && record.manager.is_some_and(|pid| self.control.is_alive(pid))
            }
            Some(ServerTopologyMode::SingleProcess) => {
                record.primary.is_some_and(|pid| self.control.is_alive(pid))
            }
        }
    }
}

impl std::fmt::Debug for LivenessChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessChecker").finish_non_exhaustive()
    }
}
