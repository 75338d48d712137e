//! CLI error type and exit codes.
//!
//! Handlers return `anyhow::Result`; at the edge the error chain is
//! classified into a [`CliError`], which decides the exit code.

use std::io;

use harbor_core::{ConfigError, RuntimeError, SupervisorError};
use thiserror::Error;

/// CLI error, one variant per exit code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("{0}")]
    General(String),

    /// Argument parsing error.
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    AlreadyRunning(String),

    #[error("{0}")]
    NotRunning(String),

    #[error("{0}")]
    Timeout(String),

    /// Signal delivery, daemonizing, spawning.
    #[error("{0}")]
    Os(String),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Config(String),
}

impl CliError {
    /// Exit code, following sysexits.h where one fits:
    /// - 0: success
    /// - 1: general error
    /// - 2: usage
    /// - 3: already running
    /// - 4: not running
    /// - 5: timed out stopping
    /// - 71: OS error (`EX_OSERR`)
    /// - 74: I/O error (`EX_IOERR`)
    /// - 78: configuration error (`EX_CONFIG`)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::General(_) => 1,
            Self::Usage(_) => 2,
            Self::AlreadyRunning(_) => 3,
            Self::NotRunning(_) => 4,
            Self::Timeout(_) => 5,
            Self::Os(_) => 71,
            Self::Io(_) => 74,
            Self::Config(_) => 78,
        }
    }

    /// Same category, different message.
    fn with_message(&self, message: String) -> Self {
        match self {
            Self::General(_) => Self::General(message),
            Self::Usage(_) => Self::Usage(message),
            Self::AlreadyRunning(_) => Self::AlreadyRunning(message),
            Self::NotRunning(_) => Self::NotRunning(message),
            Self::Timeout(_) => Self::Timeout(message),
            Self::Os(_) => Self::Os(message),
            Self::Io(_) => Self::Io(message),
            Self::Config(_) => Self::Config(message),
        }
    }
}

impl From<&ConfigError> for CliError {
    fn from(err: &ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<&RuntimeError> for CliError {
    fn from(err: &RuntimeError) -> Self {
        let message = err.to_string();
        match err {
            RuntimeError::Config(_) => Self::Config(message),
            RuntimeError::Bind { .. } | RuntimeError::Io(_) => Self::Io(message),
            RuntimeError::Spawn { .. } => Self::Os(message),
            RuntimeError::NotReady { .. } | RuntimeError::ChildExited { .. } => {
                Self::General(message)
            }
        }
    }
}

impl From<&SupervisorError> for CliError {
    fn from(err: &SupervisorError) -> Self {
        let message = err.to_string();
        match err {
            SupervisorError::AlreadyRunning(_) => Self::AlreadyRunning(message),
            SupervisorError::NotRunning => Self::NotRunning(message),
            SupervisorError::Timeout { .. } => Self::Timeout(message),
            SupervisorError::ReloadUnsupported => Self::General(message),
            SupervisorError::PidFile(_) => Self::Io(message),
            SupervisorError::Signal(_) | SupervisorError::Detach(_) => Self::Os(message),
            SupervisorError::Runtime(runtime) => Self::from(runtime).with_message(message),
        }
    }
}

impl From<&io::Error> for CliError {
    fn from(err: &io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    /// Categorize by the first known error in the chain; the message keeps
    /// any context added along the way.
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{err:#}");
        let category = err.chain().find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<Self>() {
                Some(e.clone())
            } else if let Some(e) = cause.downcast_ref::<SupervisorError>() {
                Some(Self::from(e))
            } else if let Some(e) = cause.downcast_ref::<RuntimeError>() {
                Some(Self::from(e))
            } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
                Some(Self::from(e))
            } else {
                cause.downcast_ref::<io::Error>().map(Self::from)
            }
        });

        category.map_or(Self::General(message.clone()), |c| c.with_message(message))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Context;
    use harbor_core::{Pid, PidRecord};

    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let pid = Pid::new(4).unwrap();
        let cases = [
            (SupervisorError::AlreadyRunning(PidRecord::single(pid)), 3),
            (SupervisorError::NotRunning, 4),
            (
                SupervisorError::Timeout {
                    pid,
                    waited: Duration::from_secs(1),
                },
                5,
            ),
            (SupervisorError::ReloadUnsupported, 1),
            (
                SupervisorError::Runtime(RuntimeError::Config(ConfigError::EmptyProcessName)),
                78,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(CliError::from(&err).exit_code(), code, "{err}");
        }
    }

    #[test]
    fn context_keeps_category_and_message() {
        let err = anyhow::Error::new(SupervisorError::NotRunning).context("stopping harbor");
        let cli = CliError::from(err);
        assert_eq!(cli.exit_code(), 4);
        assert!(cli.to_string().starts_with("stopping harbor: "));
    }

    #[test]
    fn config_errors_map_to_ex_config() {
        let result: Result<(), ConfigError> = Err(ConfigError::InvalidPort("0".into()));
        let err = result.context("reading options").unwrap_err();
        let cli = CliError::from(err);
        assert_eq!(cli.exit_code(), 78);
        assert!(cli.to_string().contains("Invalid port"));
    }

    #[test]
    fn unknown_errors_are_general() {
        let cli = CliError::from(anyhow::anyhow!("boom"));
        assert_eq!(cli, CliError::General("boom".into()));
        assert_eq!(cli.exit_code(), 1);
    }
}
