//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems, detected eagerly before anything is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid port: {0} (expected 1-65535)")]
    InvalidPort(String),

    #[error("Invalid server mode: {0:?} (expected single-process or process-managed)")]
    InvalidTopology(String),

    #[error("Invalid host: {0:?}")]
    InvalidHost(String),

    #[error("Worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("Process name cannot be empty")]
    EmptyProcessName,

    #[error("Invalid document root {path}: {reason}")]
    InvalidDocumentRoot { path: PathBuf, reason: String },

    #[error("Invalid cache-control rule {pattern:?}: {reason}")]
    InvalidCacheRule { pattern: String, reason: String },

    #[error("Compression level must be between 0 and 9, got {0}")]
    InvalidCompressionLevel(u32),

    #[error("Compression min size {min} exceeds max size {max}")]
    InvalidCompressionBounds { min: u64, max: u64 },

    #[error("Max ranges must be at least 1")]
    InvalidMaxRanges,

    #[error("Invalid runtime configuration: {0}")]
    Encoding(String),
}
