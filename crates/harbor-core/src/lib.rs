//! Core types for harbor: process identity, topology, configuration and the
//! ports through which the supervisor reaches the operating system and the
//! HTTP runtime.
//!
//! This crate does no I/O beyond configuration checks; implementations live
//! in `harbor-runtime`.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod paths;
pub mod ports;

pub use config::{ConfigError, ServerConfig, StaticFilesConfig, parse_port};
pub use domain::{ParsePidError, Pid, PidRecord, ServerStatus, ServerTopologyMode};
pub use ports::{
    ControlSignal, PidFileError, ProcessControl, ProcessControlError, RuntimeError,
    RuntimeHandle, ServerRuntime, SupervisorError,
};
