//! Domain types shared by the supervisor, the runtime and the adapters.

mod pid;
mod topology;

use std::fmt;

pub use pid::{ParsePidError, Pid, PidRecord};
pub use topology::ServerTopologyMode;

/// Result of a status query against the persisted pid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// No record, or the recorded processes are not alive.
    NotRunning,
    /// The recorded processes are alive.
    Running(PidRecord),
}

impl ServerStatus {
    /// True for [`ServerStatus::Running`].
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "not running"),
            Self::Running(record) => write!(f, "running ({record})"),
        }
    }
}
