//! Server topology modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// How the HTTP server is laid out across OS processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerTopologyMode {
    /// One process accepts and handles every request.
    #[default]
    SingleProcess,
    /// A manager process forks and supervises worker processes.
    ProcessManaged,
}

impl ServerTopologyMode {
    /// Canonical string form, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleProcess => "single-process",
            Self::ProcessManaged => "process-managed",
        }
    }
}

impl fmt::Display for ServerTopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerTopologyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single-process" | "single" => Ok(Self::SingleProcess),
            "process-managed" | "managed" => Ok(Self::ProcessManaged),
            _ => Err(ConfigError::InvalidTopology(s.to_string())),
        }
    }
}
