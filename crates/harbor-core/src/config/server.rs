//! Server configuration and its eager validation.

use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, StaticFilesConfig};
use crate::domain::ServerTopologyMode;
use crate::paths::default_pid_file;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROCESS_NAME: &str = "harbor";
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable carrying the serialized configuration from the
/// primary process to manager and worker processes.
pub const RUNTIME_CONFIG_ENV: &str = "HARBOR_RUNTIME_CONFIG";

/// Everything needed to start a harbor server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub topology: ServerTopologyMode,
    /// Workers spawned by the manager in process-managed topology.
    pub worker_count: usize,
    pub pid_file: PathBuf,
    /// Prefix for process titles (`<name>-master`, `<name>-worker`, ...).
    pub process_name: String,
    /// Grace period for stopping the server and its workers.
    pub shutdown_timeout: Duration,
    pub static_files: StaticFilesConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            topology: ServerTopologyMode::default(),
            worker_count: default_worker_count(),
            pid_file: default_pid_file(),
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            static_files: StaticFilesConfig::default(),
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Parse a port number, rejecting anything outside 1..=65535.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|port| u16::try_from(port).ok())
        .filter(|port| *port != 0)
        .ok_or_else(|| ConfigError::InvalidPort(raw.to_string()))
}

impl ServerConfig {
    /// Validate every field. Called before the supervisor starts anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }

        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.worker_count));
        }

        if self.process_name.trim().is_empty() {
            return Err(ConfigError::EmptyProcessName);
        }

        self.socket_addr()?;
        self.static_files.validate()
    }

    /// Resolve `host:port` to the address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        }

        let host = host.trim_start_matches('[').trim_end_matches(']');
        (host, self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::InvalidHost(self.host.clone()))
    }

    /// Serialize for [`RUNTIME_CONFIG_ENV`].
    pub fn to_env_value(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Encoding(e.to_string()))
    }

    pub fn from_env_value(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Encoding(e.to_string()))
    }

    /// Read and validate the configuration handed down by the primary
    /// process.
    pub fn from_runtime_env() -> Result<Self, ConfigError> {
        let raw = env::var(RUNTIME_CONFIG_ENV)
            .map_err(|_| ConfigError::Encoding(format!("{RUNTIME_CONFIG_ENV} is not set")))?;
        let config = Self::from_env_value(&raw)?;
        config.validate()?;
        Ok(config)
    }
}
