//! Validated server configuration.
//!
//! Values arrive already parsed (CLI flags, environment); this module only
//! checks them, eagerly, so nothing fails at request time because of bad
//! configuration.

mod error;
mod server;
mod static_files;

pub use error::ConfigError;
pub use server::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROCESS_NAME, DEFAULT_SHUTDOWN_TIMEOUT,
    RUNTIME_CONFIG_ENV, ServerConfig, parse_port,
};
pub use static_files::{
    CacheControlRule, CompressionConfig, DEFAULT_CACHE_CONTROL, DEFAULT_COMPRESSION_LEVEL,
    DEFAULT_COMPRESSION_MAX_SIZE, DEFAULT_COMPRESSION_MIN_SIZE, DEFAULT_MAX_RANGES,
    StaticFilesConfig,
};
