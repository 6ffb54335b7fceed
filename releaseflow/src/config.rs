//! Top-level release configuration.

use crate::core::BuildMode;
use crate::errors::ConfigError;
use crate::nexus::NexusConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Nexus REST base URL.
pub const ENV_NEXUS_URL: &str = "NEXUS_URL";
/// Environment variable holding the request timeout in seconds.
pub const ENV_NEXUS_TIMEOUT: &str = "NEXUS_TIMEOUT_SECONDS";
/// Environment variable holding the Nexus user.
pub const ENV_NEXUS_USER: &str = "NEXUS_USER";
/// Environment variable holding the Nexus password.
pub const ENV_NEXUS_PASSWORD: &str = "NEXUS_PASSWORD";
/// Environment variable selecting the build mode.
pub const ENV_BUILD_MODE: &str = "BUILD_MODE";
/// Environment variable holding the Docker registry host.
pub const ENV_DOCKER_REGISTRY: &str = "DOCKER_REGISTRY";

/// Settings for one release run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Nexus connection.
    #[serde(default)]
    pub nexus: NexusConfig,
    /// Full build or deploy only.
    #[serde(default)]
    pub build_mode: BuildMode,
    /// Registry prefix for image tags.
    #[serde(default = "default_docker_registry")]
    pub docker_registry: String,
    /// Directory holding the project; shell commands run here.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
}

fn default_docker_registry() -> String {
    "localhost:5000".to_string()
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            nexus: NexusConfig::default(),
            build_mode: BuildMode::default(),
            docker_registry: default_docker_registry(),
            working_dir: default_working_dir(),
        }
    }
}

impl ReleaseConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Nexus connection.
    #[must_use]
    pub fn with_nexus(mut self, nexus: NexusConfig) -> Self {
        self.nexus = nexus;
        self
    }

    /// Sets the build mode.
    #[must_use]
    pub fn with_build_mode(mut self, mode: BuildMode) -> Self {
        self.build_mode = mode;
        self
    }

    /// Sets the Docker registry.
    #[must_use]
    pub fn with_docker_registry(mut self, registry: impl Into<String>) -> Self {
        self.docker_registry = registry.into();
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ReleaseConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; unset or blank keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Fails when the timeout is not a positive number or the build mode is
    /// unknown.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_NEXUS_URL) {
            config.nexus.base_url = url;
        }
        if let Some(raw) = get(ENV_NEXUS_TIMEOUT) {
            let seconds: f64 = raw
                .parse()
                .map_err(|_| ConfigError::invalid_value(ENV_NEXUS_TIMEOUT, &raw, "expected a number of seconds"))?;
            config.nexus.timeout_seconds = seconds;
            if config.nexus.timeout().is_none() {
                return Err(ConfigError::invalid_value(ENV_NEXUS_TIMEOUT, &raw, "must be positive"));
            }
        }
        if let Some(user) = get(ENV_NEXUS_USER) {
            config.nexus.user_name = Some(user);
            config.nexus.password = get(ENV_NEXUS_PASSWORD);
        }
        if let Some(raw) = get(ENV_BUILD_MODE) {
            config.build_mode = BuildMode::parse(&raw)
                .ok_or_else(|| ConfigError::invalid_value(ENV_BUILD_MODE, &raw, "expected 'full' or 'deploy-only'"))?;
        }
        if let Some(registry) = get(ENV_DOCKER_REGISTRY) {
            config.docker_registry = registry;
        }

        Ok(config)
    }
}
