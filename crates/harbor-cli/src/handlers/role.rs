//! Entry points of the internal manager and worker processes.
//!
//! Both read their configuration from the environment set by the parent;
//! see [`harbor_runtime::RoleLauncher`].

use anyhow::{Context, Result};
use harbor_runtime::{run_manager, run_worker};

pub fn manager() -> Result<()> {
    run_manager().context("manager process")
}

pub fn worker() -> Result<()> {
    run_worker().context("worker process")
}
