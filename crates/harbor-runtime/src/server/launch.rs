//! Spawning the manager and worker roles of the process-managed topology.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use harbor_core::config::RUNTIME_CONFIG_ENV;
use harbor_core::{RuntimeError, ServerConfig};
use tokio::process::{Child, Command};
use tracing::debug;

/// Process role inside the process-managed topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Manager,
    Worker,
}

impl Role {
    /// Subcommand that enters this role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to re-execute the server binary in another role.
#[derive(Debug, Clone)]
pub struct RoleLauncher {
    program: PathBuf,
    leading_args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl RoleLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// The running executable.
    pub fn current_exe() -> Result<Self, RuntimeError> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Arguments placed before the role subcommand.
    #[must_use]
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Extra environment for spawned roles, on top of the inherited one.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Spawn `role` with `config` passed through [`RUNTIME_CONFIG_ENV`].
    ///
    /// Standard output and error are inherited so the child logs where its
    /// parent does. The child is killed if its handle is dropped.
    pub fn spawn(&self, role: Role, config: &ServerConfig) -> Result<Child, RuntimeError> {
        let encoded = config.to_env_value()?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(role.as_str())
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .env(RUNTIME_CONFIG_ENV, encoded)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| RuntimeError::Spawn {
            role: role.as_str(),
            source,
        })?;
        debug!(%role, pid = ?child.id(), program = %self.program.display(), "spawned");
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let launcher = RoleLauncher::new("/nonexistent/harbor-binary");
        let err = launcher
            .spawn(Role::Worker, &ServerConfig::default())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Spawn { role: "worker", .. }));
    }

    #[tokio::test]
    async fn child_receives_role_and_config() {
        // `sh -c <script> <role>`: the role lands in $0.
        let launcher = RoleLauncher::new("sh")
            .with_leading_args([
                "-c",
                r#"test "$0" = manager && test -n "$HARBOR_RUNTIME_CONFIG" && test "$HARBOR_TEST_EXTRA" = yes"#,
            ])
            .with_env("HARBOR_TEST_EXTRA", "yes");
        let mut child = launcher
            .spawn(Role::Manager, &ServerConfig::default())
            .unwrap();
        assert!(child.wait().await.unwrap().success());
    }
}
