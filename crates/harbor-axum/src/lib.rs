//! Axum adapter for harbor.
//!
//! Puts the static resource pipeline in front of an application router,
//! renders pipeline decisions as streamed HTTP responses, and serves the
//! result with graceful shutdown.

#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings; these are used by tests/
#[cfg(test)]
use flate2 as _;
#[cfg(test)]
use tempfile as _;

pub mod error;
pub mod listener;
pub mod response;
pub mod routes;
pub mod runner;
mod serve;

pub use error::HttpError;
pub use routes::{app_routes, router};
pub use runner::RequestHandlerRunner;
pub use serve::serve;
