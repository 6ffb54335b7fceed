//! Error types for the releaseflow pipeline.
//!
//! Every task and stage fails with a single shape, [`BuildError`], which
//! always names the stage and task that detected the failure. Errors raised
//! at I/O boundaries ([`NexusError`], [`ConfigError`], collaborator
//! `anyhow::Error`s) are converted into a `BuildError` before they reach the
//! pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The failure value surfaced by every task and stage.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{stage_name}/{task_name}] {message}")]
pub struct BuildError {
    /// Human readable failure message.
    pub message: String,
    /// Name of the stage that was running.
    pub stage_name: String,
    /// Name of the task that detected the failure.
    pub task_name: String,
}

impl BuildError {
    /// Creates a new build error with explicit provenance.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        stage_name: impl Into<String>,
        task_name: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            stage_name: stage_name.into(),
            task_name: task_name.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("message".to_string(), serde_json::json!(self.message));
        map.insert("stage_name".to_string(), serde_json::json!(self.stage_name));
        map.insert("task_name".to_string(), serde_json::json!(self.task_name));
        map
    }
}

/// Errors returned by the Nexus client.
#[derive(Debug, Error)]
pub enum NexusError {
    /// The request could not be sent or the body could not be read.
    #[error("Nexus request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Nexus answered with a non-success status code.
    #[error("Nexus returned status {status} for {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// The response body was not a valid search result.
    #[error("Malformed Nexus response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Writing a downloaded artifact failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured base URL is unusable.
    #[error("Invalid Nexus URL '{0}'")]
    InvalidUrl(String),

    /// The configured timeout is not a positive number of seconds.
    #[error("Invalid Nexus timeout {0}: expected a positive number of seconds")]
    InvalidTimeout(f64),
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// The offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display_names_provenance() {
        let err = BuildError::new("boom", "config-validation", "validate-version");
        assert_eq!(err.to_string(), "[config-validation/validate-version] boom");
    }

    #[test]
    fn test_build_error_to_dict() {
        let err = BuildError::new("boom", "deploy", "deploy-to-kubernetes");
        let dict = err.to_dict();

        assert_eq!(dict.get("message").unwrap(), "boom");
        assert_eq!(dict.get("stage_name").unwrap(), "deploy");
        assert_eq!(dict.get("task_name").unwrap(), "deploy-to-kubernetes");
    }

    #[test]
    fn test_nexus_status_error_message() {
        let err = NexusError::Status {
            status: 503,
            url: "http://nexus/search".to_string(),
        };
        assert_eq!(err.to_string(), "Nexus returned status 503 for http://nexus/search");
    }

    #[test]
    fn test_config_error() {
        let err = ConfigError::invalid_value("BUILD_MODE", "nope", "expected full or deploy-only");
        assert!(err.to_string().contains("BUILD_MODE"));
        assert!(err.to_string().contains("nope"));
    }
}
