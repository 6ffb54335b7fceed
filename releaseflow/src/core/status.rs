//! Task status and build mode enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle status attached to a task log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task body is about to run.
    Started,
    /// Progress reported from inside a task body.
    Running,
    /// Task was bypassed by a skip predicate.
    Skipped,
    /// Task body completed successfully.
    Succeeded,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Running => write!(f, "running"),
            Self::Skipped => write!(f, "skipped"),
            Self::Succeeded => write!(f, "succeeded"),
        }
    }
}

/// How much of the pipeline a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// Validate, build, publish and deploy.
    #[default]
    Full,
    /// Redeploy an already published version.
    DeployOnly,
}

impl BuildMode {
    /// Parses a mode name as used in configuration.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" | "" => Some(Self::Full),
            "deploy-only" | "deploy_only" | "deployonly" => Some(Self::DeployOnly),
            _ => None,
        }
    }

    /// Returns true in deploy-only mode.
    #[must_use]
    pub fn is_deploy_only(&self) -> bool {
        matches!(self, Self::DeployOnly)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::DeployOnly => write!(f, "deploy-only"),
        }
    }
}
