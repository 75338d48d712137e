//! Process identity types.
//!
//! A running harbor server is identified by up to two OS process ids: the
//! primary (master) process and, in process-managed topology, the manager
//! process that supervises the workers.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ServerTopologyMode;

/// An OS process id.
///
/// Backed by `NonZeroU32` because pid 0 never names a real process; an
/// absent pid is expressed as `Option<Pid>`, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Pid(NonZeroU32);

impl Pid {
    /// Wrap a raw pid. Returns `None` for 0.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Pid of the calling process.
    #[must_use]
    pub fn current() -> Self {
        Self(NonZeroU32::new(std::process::id()).unwrap_or(NonZeroU32::MIN))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid non-zero pid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid process id: {0:?}")]
pub struct ParsePidError(pub String);

impl FromStr for Pid {
    type Err = ParsePidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParsePidError(s.to_string()))
    }
}

impl TryFrom<u32> for Pid {
    type Error = ParsePidError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| ParsePidError(raw.to_string()))
    }
}

impl From<Pid> for u32 {
    fn from(pid: Pid) -> Self {
        pid.get()
    }
}

/// The persisted identity of a running server.
///
/// `manager` being set implies process-managed topology; `manager` absent
/// with `primary` set implies single-process topology. Both absent means no
/// server is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidRecord {
    /// Primary (master) process id.
    pub primary: Option<Pid>,
    /// Manager process id, only present in process-managed topology.
    pub manager: Option<Pid>,
}

impl PidRecord {
    /// Record with both fields unset.
    pub const EMPTY: Self = Self {
        primary: None,
        manager: None,
    };

    /// Record for a single-process server.
    #[must_use]
    pub const fn single(primary: Pid) -> Self {
        Self {
            primary: Some(primary),
            manager: None,
        }
    }

    /// Record for a process-managed server.
    #[must_use]
    pub const fn managed(primary: Pid, manager: Pid) -> Self {
        Self {
            primary: Some(primary),
            manager: Some(manager),
        }
    }

    /// True when neither pid is recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.primary.is_none() && self.manager.is_none()
    }

    /// Topology implied by which fields are set.
    #[must_use]
    pub const fn topology(&self) -> Option<ServerTopologyMode> {
        match (self.primary, self.manager) {
            (_, Some(_)) => Some(ServerTopologyMode::ProcessManaged),
            (Some(_), None) => Some(ServerTopologyMode::SingleProcess),
            (None, None) => None,
        }
    }

    /// Process that receives lifecycle signals: the manager when present,
    /// otherwise the primary.
    #[must_use]
    pub const fn signal_target(&self) -> Option<Pid> {
        match self.manager {
            Some(manager) => Some(manager),
            None => self.primary,
        }
    }
}

impl fmt::Display for PidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.primary, self.manager) {
            (Some(primary), Some(manager)) => {
                write!(f, "primary pid {primary}, manager pid {manager}")
            }
            (Some(primary), None) => write!(f, "primary pid {primary}"),
            (None, Some(manager)) => write!(f, "manager pid {manager} (no primary)"),
            (None, None) => write!(f, "no pids"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_pid() {
        assert!(Pid::new(0).is_none());
        assert!("0".parse::<Pid>().is_err());
        assert_eq!("42".parse::<Pid>().unwrap().get(), 42);
        assert_eq!(" 7 \n".parse::<Pid>().unwrap().get(), 7);
    }

    #[test]
    fn topology_follows_manager_field() {
        let primary = Pid::new(10).unwrap();
        let manager = Pid::new(11).unwrap();

        assert_eq!(PidRecord::EMPTY.topology(), None);
        assert_eq!(
            PidRecord::single(primary).topology(),
            Some(ServerTopologyMode::SingleProcess)
        );
        assert_eq!(
            PidRecord::managed(primary, manager).topology(),
            Some(ServerTopologyMode::ProcessManaged)
        );
    }

    #[test]
    fn signal_target_prefers_manager() {
        let primary = Pid::new(10).unwrap();
        let manager = Pid::new(11).unwrap();

        assert_eq!(PidRecord::single(primary).signal_target(), Some(primary));
        assert_eq!(
            PidRecord::managed(primary, manager).signal_target(),
            Some(manager)
        );
        assert_eq!(PidRecord::EMPTY.signal_target(), None);
    }

    #[test]
    fn serde_rejects_zero_pid() {
        let parsed: Result<PidRecord, _> =
            serde_json::from_str(r#"{"primary":0,"manager":null}"#);
        assert!(parsed.is_err());

        let record = PidRecord::managed(Pid::new(5).unwrap(), Pid::new(6).unwrap());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<PidRecord>(&json).unwrap(), record);
    }
}
