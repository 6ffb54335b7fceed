//! External collaborators used by the release pipeline.
//!
//! Each collaborator is a trait so the pipeline can run against real tools
//! in production and against doubles in tests. Errors cross these seams as
//! [`anyhow::Error`] and are turned into build errors by the calling task.

use crate::core::ProjectDescriptor;
use anyhow::{bail, Context};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Detects the project living in a working directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectIdentifier: Send + Sync {
    /// Builds the descriptor for the project in `dir`.
    async fn identify(&self, dir: &Path) -> anyhow::Result<ProjectDescriptor>;
}

/// Options for a shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOptions {
    /// Directory to run in; the current directory when unset.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl ShellOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Runs shell commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    /// Runs `command` and returns its standard output.
    async fn exec(&self, command: &str, options: &ShellOptions) -> anyhow::Result<String>;
}

/// [`ShellExecutor`] that runs commands through `sh -c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioShellExecutor;

#[async_trait]
impl ShellExecutor for TokioShellExecutor {
    async fn exec(&self, command: &str, options: &ShellOptions) -> anyhow::Result<String> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        if let Some(dir) = &options.working_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to spawn `{command}`"))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(command = %command, status = ?output.status.code(), "Shell command finished");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{command}` exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }
        Ok(stdout)
    }
}

/// Deploys applications to Kubernetes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KubernetesDeployer: Send + Sync {
    /// Rolls out the described application.
    async fn deploy(&self, descriptor: &ProjectDescriptor) -> anyhow::Result<()>;
}

/// Lists the tags of the current git repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitTagLister: Send + Sync {
    /// Returns the tags, one per line.
    async fn list_tags(&self) -> anyhow::Result<String>;
}

/// Registry credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub user_name: String,
    /// Password or token.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .finish()
    }
}

/// Supplies registry credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Returns the credentials, or an error naming what is missing.
    async fn credentials(&self) -> anyhow::Result<Credentials>;
}

/// [`CredentialSource`] reading two environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    user_key: String,
    password_key: String,
}

impl EnvCredentialSource {
    /// Reads from the given variable names.
    pub fn new(user_key: impl Into<String>, password_key: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            password_key: password_key.into(),
        }
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new("NEXUS_USER", "NEXUS_PASSWORD")
    }
}

#[async_trait]
impl CredentialSource for EnvCredentialSource {
    async fn credentials(&self) -> anyhow::Result<Credentials> {
        let user_name = std::env::var(&self.user_key)
            .with_context(|| format!("Missing credentials: {} is not set", self.user_key))?;
        let password = std::env::var(&self.password_key)
            .with_context(|| format!("Missing credentials: {} is not set", self.password_key))?;
        Ok(Credentials { user_name, password })
    }
}
