//! Stop command handler.

use std::time::Duration;

use anyhow::{Context, Result};

use super::control_supervisor;
use crate::commands::PidFileArg;

/// Execute the stop command: signal the recorded server and wait for it.
pub fn execute(pid_file: &PidFileArg, timeout_secs: u64) -> Result<()> {
    let supervisor = control_supervisor(&pid_file.resolve());
    let record = supervisor
        .stop(Duration::from_secs(timeout_secs))
        .context("stopping harbor")?;
    println!("harbor stopped ({record})");
    Ok(())
}
