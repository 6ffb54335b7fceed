//! Logging setup and run-level span attributes.

use crate::core::{BuildMode, ProjectDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::Span;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`; an unknown level falls back to
/// `info`. Returns `false` when a subscriber was already installed.
pub fn init_logging(level: &str, json: bool) -> bool {
    let fallback = match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

/// Attributes recorded on the span wrapping one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpanAttributes {
    /// Unique id of the run.
    pub run_id: Uuid,
    /// `group:name` of the project, when known.
    pub project: Option<String>,
    /// Project version, when known.
    pub version: Option<String>,
    /// Build mode.
    pub build_mode: BuildMode,
}

impl RunSpanAttributes {
    /// Starts attributes for a fresh run.
    #[must_use]
    pub fn new(build_mode: BuildMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            project: None,
            version: None,
            build_mode,
        }
    }

    /// Records the project being released.
    #[must_use]
    pub fn with_project(mut self, descriptor: &ProjectDescriptor) -> Self {
        self.project = Some(descriptor.coordinates());
        self.version = Some(descriptor.version.clone());
        self
    }

    /// Flattens the attributes into dotted keys.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        attrs.insert("release.run_id".to_string(), self.run_id.to_string());
        attrs.insert("release.build_mode".to_string(), self.build_mode.to_string());
        if let Some(ref v) = self.project {
            attrs.insert("release.project".to_string(), v.clone());
        }
        if let Some(ref v) = self.version {
            attrs.insert("release.version".to_string(), v.clone());
        }
        attrs
    }

    /// Opens the `release_run` span.
    #[must_use]
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "release_run",
            run_id = %self.run_id,
            build_mode = %self.build_mode,
            project = self.project.as_deref().unwrap_or(""),
            version = self.version.as_deref().unwrap_or(""),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProjectType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attributes_include_project() {
        let descriptor = ProjectDescriptor::new(ProjectType::MavenLibrary, "com.acme", "lib", "1.2.0");
        let attrs = RunSpanAttributes::new(BuildMode::Full).with_project(&descriptor);
        let map = attrs.to_attributes();

        assert_eq!(map.get("release.project"), Some(&descriptor.coordinates()));
        assert_eq!(map.get("release.version").map(String::as_str), Some("1.2.0"));
        assert_eq!(map.get("release.run_id"), Some(&attrs.run_id.to_string()));
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunSpanAttributes::new(BuildMode::Full);
        let b = RunSpanAttributes::new(BuildMode::Full);
        assert_ne!(a.run_id, b.run_id);
        assert!(!a.to_attributes().contains_key("release.project"));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging("debug", false);
        assert!(!init_logging("info", true));
    }
}
