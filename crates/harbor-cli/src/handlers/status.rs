//! Status command handler.

use harbor_core::ServerStatus;

use super::control_supervisor;
use crate::commands::PidFileArg;

/// Print the server status. Returns whether a server is running.
pub fn execute(pid_file: &PidFileArg) -> bool {
    let supervisor = control_supervisor(&pid_file.resolve());
    match supervisor.status() {
        ServerStatus::Running(record) => {
            println!("harbor is running ({record})");
            true
        }
        ServerStatus::NotRunning => {
            println!("harbor is not running");
            false
        }
    }
}
