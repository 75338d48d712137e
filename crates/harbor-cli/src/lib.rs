//! Command-line interface of the harbor HTTP server.
//!
//! The `harbor` binary starts, stops, reloads and reports on a server
//! whose processes are tracked in a pid file. The same binary also runs
//! the hidden `manager` and `worker` roles of the process-managed
//! topology.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only.
use dotenvy as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use commands::{Commands, PidFileArg, StartArgs, StaticArgs};
pub use error::CliError;
pub use parser::Cli;
