//! Port definitions (trait abstractions) for the operating system and the
//! HTTP runtime.
//!
//! The supervisor only talks to processes and to the server runtime through
//! these traits, so its state machine can be exercised against fakes.
//!
//! # Design Rules
//!
//! - No `nix` or `tokio` types in any signature
//! - Intent-based methods (`is_alive`, `send`), not raw syscalls
//! - Every fallible operation returns a dedicated error enum

mod process_control;
mod server_runtime;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{Pid, PidRecord};

pub use process_control::{ControlSignal, ProcessControl};
pub use server_runtime::{RuntimeHandle, ServerRuntime};

/// Failures persisting or removing the pid record.
#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("Failed to create pid directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write pid file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove pid file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of the OS process-control capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessControlError {
    #[error("No such process: {0}")]
    NoSuchProcess(Pid),

    #[error("Permission denied signalling process {0}")]
    PermissionDenied(Pid),

    #[error("Failed to signal process {pid}: {reason}")]
    Signal { pid: Pid, reason: String },

    #[error("Failed to detach from the terminal: {0}")]
    Detach(String),
}

/// Failures of the HTTP server runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn {role} process: {source}")]
    Spawn {
        role: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Server at {address} not ready after {waited:?}")]
    NotReady { address: String, waited: Duration },

    #[error("{role} process exited unexpectedly with status {status}")]
    ChildExited { role: &'static str, status: String },

    #[error("Server runtime I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One variant per process-control outcome of the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Server is already running ({0})")]
    AlreadyRunning(PidRecord),

    #[error("Server is not running")]
    NotRunning,

    #[error("Process {pid} still alive after {waited:?}; pid record left in place")]
    Timeout { pid: Pid, waited: Duration },

    #[error("Reload requires the process-managed topology")]
    ReloadUnsupported,

    #[error(transparent)]
    PidFile(#[from] PidFileError),

    #[error("Failed to signal server: {0}")]
    Signal(#[source] ProcessControlError),

    #[error("Server runtime failed: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Failed to daemonize: {0}")]
    Detach(#[source] ProcessControlError),
}
