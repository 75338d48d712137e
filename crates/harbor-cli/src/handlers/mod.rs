//! Command handlers.
//!
//! Each handler is a thin wrapper: it turns parsed arguments into a
//! [`harbor_runtime::ProcessSupervisor`] call and prints the outcome.
//! Errors are returned as `anyhow::Result` and classified in `main`.

pub mod reload;
pub mod role;
pub mod start;
pub mod status;
pub mod stop;

use std::path::Path;
use std::sync::Arc;

use harbor_core::ProcessControl;
use harbor_runtime::{PidStore, ProcessSupervisor, SignalProcessControl};

/// Supervisor for the control commands, which never start a runtime.
pub(crate) fn control_supervisor(pid_file: &Path) -> ProcessSupervisor<()> {
    ProcessSupervisor::new(
        PidStore::new(pid_file),
        Arc::new(SignalProcessControl::new()) as Arc<dyn ProcessControl>,
        (),
    )
}
