//! Process-level machinery for harbor: the pid record, liveness probes,
//! signal delivery, the lifecycle supervisor and the HTTP runtime it starts.
//!
//! # Design Rules
//!
//! - The supervisor is synchronous; tokio runtimes are created by the HTTP
//!   runtime only after any daemonizing has happened
//! - Every OS interaction the supervisor makes goes through
//!   [`ProcessControl`](harbor_core::ProcessControl) so it can be faked

#![deny(unused_crate_dependencies)]

#[cfg(not(unix))]
compile_error!("harbor-runtime supports Unix platforms only");

pub mod control;
pub mod liveness;
pub mod pidfile;
pub mod server;
pub mod shutdown;
pub mod supervisor;

pub use control::SignalProcessControl;
pub use liveness::LivenessChecker;
pub use pidfile::PidStore;
pub use server::{HttpRuntime, Role, RoleLauncher, run_manager, run_worker};
pub use supervisor::{DEFAULT_POLL_INTERVAL, ProcessSupervisor, StartedServer, SupervisorState};
