//! In-memory doubles for Nexus and the external collaborators.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collaborators::{
    CredentialSource, Credentials, GitTagLister, KubernetesDeployer, ProjectIdentifier, ShellExecutor, ShellOptions,
};
use crate::core::ProjectDescriptor;
use crate::errors::NexusError;
use crate::nexus::{NexusClient, NexusSearchResult};

#[derive(Debug, Default)]
struct NexusState {
    maven_snapshots: NexusSearchResult,
    maven_releases: NexusSearchResult,
    npm_betas: NexusSearchResult,
    npm_releases: NexusSearchResult,
    docker_releases: NexusSearchResult,
    downloads: HashMap<String, Vec<u8>>,
    failure: Option<String>,
    calls: Vec<String>,
}

/// A [`NexusClient`] answering every search with a canned result.
///
/// Clones share state, so a test can keep one handle and inspect the calls
/// made through another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNexusClient {
    state: Arc<Mutex<NexusState>>,
}

impl InMemoryNexusClient {
    /// Creates a client whose searches all return nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Maven snapshot search result.
    #[must_use]
    pub fn with_maven_snapshots(self, result: NexusSearchResult) -> Self {
        self.state.lock().maven_snapshots = result;
        self
    }

    /// Sets the Maven release search result.
    #[must_use]
    pub fn with_maven_releases(self, result: NexusSearchResult) -> Self {
        self.state.lock().maven_releases = result;
        self
    }

    /// Sets the npm pre-release search result.
    #[must_use]
    pub fn with_npm_betas(self, result: NexusSearchResult) -> Self {
        self.state.lock().npm_betas = result;
        self
    }

    /// Sets the npm release search result.
    #[must_use]
    pub fn with_npm_releases(self, result: NexusSearchResult) -> Self {
        self.state.lock().npm_releases = result;
        self
    }

    /// Sets the Docker search result.
    #[must_use]
    pub fn with_docker_releases(self, result: NexusSearchResult) -> Self {
        self.state.lock().docker_releases = result;
        self
    }

    /// Serves `bytes` for downloads of `url`.
    #[must_use]
    pub fn with_download(self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.state.lock().downloads.insert(url.into(), bytes.into());
        self
    }

    /// Makes every call fail with `message`.
    #[must_use]
    pub fn failing(self, message: impl Into<String>) -> Self {
        self.state.lock().failure = Some(message.into());
        self
    }

    /// Calls made so far, as `"<operation> <args...>"` with `-` for a
    /// missing version.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    fn answer(
        &self,
        call: String,
        pick: impl FnOnce(&NexusState) -> NexusSearchResult,
    ) -> Result<NexusSearchResult, NexusError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if let Some(message) = &state.failure {
            return Err(NexusError::Io(std::io::Error::other(message.clone())));
        }
        Ok(pick(&state))
    }
}

#[async_trait]
impl NexusClient for InMemoryNexusClient {
    async fn search_for_maven_snapshots(
        &self,
        group: &str,
        artifact: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        let call = format!("maven_snapshots {group} {artifact} {}", version.unwrap_or("-"));
        self.answer(call, |s| s.maven_snapshots.clone())
    }

    async fn search_for_maven_releases(
        &self,
        group: &str,
        artifact: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        let call = format!("maven_releases {group} {artifact} {}", version.unwrap_or("-"));
        self.answer(call, |s| s.maven_releases.clone())
    }

    async fn search_for_npm_betas(
        &self,
        group: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        let call = format!("npm_betas {group} {name} {}", version.unwrap_or("-"));
        self.answer(call, |s| s.npm_betas.clone())
    }

    async fn search_for_npm_releases(
        &self,
        group: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        let call = format!("npm_releases {group} {name} {}", version.unwrap_or("-"));
        self.answer(call, |s| s.npm_releases.clone())
    }

    async fn search_for_docker_releases(&self, name: &str) -> Result<NexusSearchResult, NexusError> {
        self.answer(format!("docker_releases {name}"), |s| s.docker_releases.clone())
    }

    async fn download_artifact(&self, url: &str, target_path: &Path) -> Result<PathBuf, NexusError> {
        let bytes = {
            let mut state = self.state.lock();
            state.calls.push(format!("download {url}"));
            if let Some(message) = &state.failure {
                return Err(NexusError::Io(std::io::Error::other(message.clone())));
            }
            state
                .downloads
                .get(url)
                .cloned()
                .ok_or_else(|| NexusError::Status { status: 404, url: url.to_string() })?
        };
        tokio::fs::write(target_path, bytes).await?;
        Ok(target_path.to_path_buf())
    }
}

/// A [`ShellExecutor`] that records commands instead of running them.
#[derive(Debug, Default)]
pub struct RecordingShellExecutor {
    commands: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingShellExecutor {
    /// Creates an executor where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any command containing `fragment`.
    #[must_use]
    pub fn failing_on(mut self, fragment: impl Into<String>) -> Self {
        self.fail_on = Some(fragment.into());
        self
    }

    /// Commands received so far.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl ShellExecutor for RecordingShellExecutor {
    async fn exec(&self, command: &str, _options: &ShellOptions) -> anyhow::Result<String> {
        self.commands.lock().push(command.to_string());
        match &self.fail_on {
            Some(fragment) if command.contains(fragment.as_str()) => {
                anyhow::bail!("`{command}` exited with status 1")
            }
            _ => Ok(String::new()),
        }
    }
}

/// A [`GitTagLister`] returning fixed tags.
#[derive(Debug, Clone, Default)]
pub struct StaticGitTags {
    tags: Vec<String>,
}

impl StaticGitTags {
    /// Creates a lister for `tags`.
    pub fn new<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl GitTagLister for StaticGitTags {
    async fn list_tags(&self) -> anyhow::Result<String> {
        Ok(self.tags.join("\n"))
    }
}

/// A [`CredentialSource`] returning fixed credentials, or reporting them
/// missing.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Option<Credentials>,
}

impl StaticCredentials {
    /// Credentials that are present.
    pub fn present(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials::new(user_name, password)),
        }
    }

    /// Credentials that are missing.
    #[must_use]
    pub fn missing() -> Self {
        Self { credentials: None }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn credentials(&self) -> anyhow::Result<Credentials> {
        self.credentials
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Missing credentials"))
    }
}

/// A [`KubernetesDeployer`] recording what it was asked to deploy.
#[derive(Debug, Default)]
pub struct RecordingDeployer {
    deployed: Mutex<Vec<ProjectDescriptor>>,
}

impl RecordingDeployer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptors deployed so far.
    #[must_use]
    pub fn deployed(&self) -> Vec<ProjectDescriptor> {
        self.deployed.lock().clone()
    }
}

#[async_trait]
impl KubernetesDeployer for RecordingDeployer {
    async fn deploy(&self, descriptor: &ProjectDescriptor) -> anyhow::Result<()> {
        self.deployed.lock().push(descriptor.clone());
        Ok(())
    }
}

/// A [`ProjectIdentifier`] that always finds the same project.
#[derive(Debug, Clone)]
pub struct StaticProjectIdentifier {
    descriptor: ProjectDescriptor,
}

impl StaticProjectIdentifier {
    /// Identifies every directory as `descriptor`.
    #[must_use]
    pub fn new(descriptor: ProjectDescriptor) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl ProjectIdentifier for StaticProjectIdentifier {
    async fn identify(&self, _dir: &Path) -> anyhow::Result<ProjectDescriptor> {
        Ok(self.descriptor.clone())
    }
}
