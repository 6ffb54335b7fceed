//! The Nexus client trait and its reqwest implementation.

use super::config::NexusConfig;
use super::models::NexusSearchResult;
use super::query::SearchQuery;
use crate::errors::NexusError;
use async_trait::async_trait;
use futures::StreamExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Read-only access to an artifact repository.
#[async_trait]
pub trait NexusClient: Send + Sync {
    /// Maven snapshots of `group:artifact`, newest first.
    async fn search_for_maven_snapshots(
        &self,
        group: &str,
        artifact: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError>;

    /// Maven releases of `group:artifact`, newest first.
    async fn search_for_maven_releases(
        &self,
        group: &str,
        artifact: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError>;

    /// npm pre-releases of `group/name`, newest first.
    async fn search_for_npm_betas(
        &self,
        group: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError>;

    /// npm releases of `group/name`, newest first.
    async fn search_for_npm_releases(
        &self,
        group: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError>;

    /// Docker images named `name`, newest first.
    async fn search_for_docker_releases(&self, name: &str) -> Result<NexusSearchResult, NexusError>;

    /// Streams `url` into `target_path` and returns the path.
    async fn download_artifact(&self, url: &str, target_path: &Path) -> Result<PathBuf, NexusError>;
}

/// [`NexusClient`] backed by the Nexus REST API.
#[derive(Debug, Clone)]
pub struct HttpNexusClient {
    http: reqwest::Client,
    config: NexusConfig,
}

impl HttpNexusClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the base URL is not an http(s) URL, the timeout is not a
    /// positive number of seconds, or the HTTP client cannot be built.
    pub fn new(config: NexusConfig) -> Result<Self, NexusError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(NexusError::InvalidUrl(config.base_url));
        }

        let timeout = config
            .timeout()
            .ok_or(NexusError::InvalidTimeout(config.timeout_seconds))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, config })
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &NexusConfig {
        &self.config
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.config.user_name {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, NexusError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NexusError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// Runs a search query.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx statuses and malformed bodies.
    pub async fn search(&self, query: &SearchQuery) -> Result<NexusSearchResult, NexusError> {
        let url = self.config.search_url();
        let start = Instant::now();

        let response = self.send(self.get(&url).query(query.params()), &url).await?;
        let body = response.text().await?;
        let result: NexusSearchResult = serde_json::from_str(&body)?;

        debug!(
            url = %url,
            params = ?query.params(),
            items = result.items.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Nexus search completed"
        );
        Ok(result)
    }
}

#[async_trait]
impl NexusClient for HttpNexusClient {
    async fn search_for_maven_snapshots(
        &self,
        group: &str,
        artifact: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        self.search(&SearchQuery::maven_snapshots(group, artifact, version)).await
    }

    async fn search_for_maven_releases(
        &self,
        group: &str,
        artifact: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        self.search(&SearchQuery::maven_releases(group, artifact, version)).await
    }

    async fn search_for_npm_betas(
        &self,
        group: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        self.search(&SearchQuery::npm_betas(group, name, version)).await
    }

    async fn search_for_npm_releases(
        &self,
        group: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<NexusSearchResult, NexusError> {
        self.search(&SearchQuery::npm_releases(group, name, version)).await
    }

    async fn search_for_docker_releases(&self, name: &str) -> Result<NexusSearchResult, NexusError> {
        self.search(&SearchQuery::docker_releases(name)).await
    }

    async fn download_artifact(&self, url: &str, target_path: &Path) -> Result<PathBuf, NexusError> {
        let response = self.send(self.get(url), url).await?;

        // Stream into a sibling and rename, so a failed download never
        // leaves a truncated artifact at `target_path`.
        let partial = partial_path(target_path);
        let written = match stream_to_file(response, &partial, target_path).await {
            Ok(written) => written,
            Err(err) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(err);
            }
        };

        debug!(url = %url, path = %target_path.display(), bytes = written, "Artifact downloaded");
        Ok(target_path.to_path_buf())
    }
}

fn partial_path(target_path: &Path) -> PathBuf {
    let mut name = target_path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    target_path.with_file_name(name)
}

async fn stream_to_file(response: reqwest::Response, partial: &Path, target_path: &Path) -> Result<usize, NexusError> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut body = response.bytes_stream();
    let mut written = 0_usize;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        written += chunk.len();
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);
    tokio::fs::rename(partial, target_path).await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = HttpNexusClient::new(NexusConfig::new("ftp://nexus")).unwrap_err();
        assert!(matches!(err, NexusError::InvalidUrl(url) if url == "ftp://nexus"));
    }

    #[test]
    fn test_rejects_unusable_timeout() {
        let config: NexusConfig =
            serde_json::from_str(r#"{"base_url": "http://nexus", "timeout_seconds": -1.0}"#).unwrap();
        let err = HttpNexusClient::new(config).unwrap_err();
        assert!(matches!(err, NexusError::InvalidTimeout(seconds) if seconds < 0.0));

        let err = HttpNexusClient::new(NexusConfig::new("http://nexus").with_timeout(f64::NAN)).unwrap_err();
        assert!(matches!(err, NexusError::InvalidTimeout(_)));
    }

    #[test]
    fn test_partial_path_is_a_sibling() {
        assert_eq!(
            partial_path(Path::new("/tmp/out/ui-1.0.0.tgz")),
            PathBuf::from("/tmp/out/ui-1.0.0.tgz.part")
        );
    }

    #[test]
    fn test_builds_with_valid_config() {
        let client = HttpNexusClient::new(NexusConfig::new("https://nexus.example.com").with_timeout(2.0)).unwrap();
        assert_eq!(client.config().base_url, "https://nexus.example.com");
    }
}
