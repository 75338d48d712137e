//! Reload command handler.

use anyhow::{Context, Result};

use super::control_supervisor;
use crate::commands::PidFileArg;

/// Ask the manager of a process-managed server to replace its workers.
pub fn execute(pid_file: &PidFileArg) -> Result<()> {
    let supervisor = control_supervisor(&pid_file.resolve());
    let record = supervisor.reload().context("reloading harbor")?;
    println!("harbor reloading workers ({record})");
    Ok(())
}
