//! Configuration for the Nexus client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for a Nexus instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexusConfig {
    /// Base URL of the REST API, e.g. `https://nexus.example.com/service/rest/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Basic auth user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Basic auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8081/service/rest/v1".to_string()
}

fn default_timeout() -> f64 {
    30.0
}

fn default_user_agent() -> String {
    concat!("releaseflow/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            user_name: None,
            password: None,
        }
    }
}

impl NexusConfig {
    /// Creates a configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets basic auth credentials.
    #[must_use]
    pub fn with_credentials(mut self, user_name: impl Into<String>, password: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self.password = Some(password.into());
        self
    }

    /// Gets timeout as Duration, or `None` unless it is a positive number of
    /// seconds that fits a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|timeout| !timeout.is_zero())
    }

    /// The search endpoint URL.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NexusConfig::default();
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.user_agent.starts_with("releaseflow/"));
        assert!(config.user_name.is_none());
    }

    #[test]
    fn test_search_url_trims_trailing_slash() {
        let config = NexusConfig::new("https://nexus.example.com/service/rest/v1/");
        assert_eq!(config.search_url(), "https://nexus.example.com/service/rest/v1/search");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: NexusConfig = serde_json::from_str(r#"{"base_url": "http://nexus"}"#).unwrap();
        assert_eq!(config.base_url, "http://nexus");
        assert!((config.timeout_seconds - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unusable_timeouts() {
        for seconds in [-1.0, 0.0, f64::NAN, f64::INFINITY, 1e30] {
            assert_eq!(NexusConfig::default().with_timeout(seconds).timeout(), None, "{seconds}");
        }
    }

    #[test]
    fn test_builders() {
        let config = NexusConfig::new("http://nexus")
            .with_timeout(5.0)
            .with_user_agent("ci")
            .with_credentials("deployer", "secret");

        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "ci");
        assert_eq!(config.user_name.as_deref(), Some("deployer"));
        assert_eq!(config.password.as_deref(), Some("secret"));
    }
}
