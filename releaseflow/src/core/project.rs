//! The project descriptor threaded through every stage.

use super::version::{has_pre_release_qualifier, is_maven_snapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of project being released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// An npm package deployed as an application image.
    NpmApplication,
    /// An npm package published for reuse.
    NpmLibrary,
    /// A Maven artifact deployed as an application image.
    MavenApplication,
    /// A Maven artifact published for reuse.
    MavenLibrary,
    /// A plain Docker image with no deployment.
    DockerImage,
    /// A Docker-only application with no upstream package registry.
    DockerApplication,
}

impl ProjectType {
    /// Returns true for types that get deployed.
    #[must_use]
    pub fn is_application(&self) -> bool {
        matches!(
            self,
            Self::NpmApplication | Self::MavenApplication | Self::DockerApplication
        )
    }

    /// Returns true for types published only to a package registry.
    #[must_use]
    pub fn is_library(&self) -> bool {
        matches!(self, Self::NpmLibrary | Self::MavenLibrary)
    }

    /// Returns true for Docker-only types.
    #[must_use]
    pub fn is_docker(&self) -> bool {
        matches!(self, Self::DockerImage | Self::DockerApplication)
    }

    /// Returns true for npm types.
    #[must_use]
    pub fn is_npm(&self) -> bool {
        matches!(self, Self::NpmApplication | Self::NpmLibrary)
    }

    /// Returns true for Maven types.
    #[must_use]
    pub fn is_maven(&self) -> bool {
        matches!(self, Self::MavenApplication | Self::MavenLibrary)
    }

    /// Returns true if `version` carries the pre-release qualifier this
    /// ecosystem uses.
    #[must_use]
    pub fn is_pre_release_version(&self, version: &str) -> bool {
        if self.is_maven() {
            is_maven_snapshot(version)
        } else {
            has_pre_release_qualifier(version)
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NpmApplication => write!(f, "npm_application"),
            Self::NpmLibrary => write!(f, "npm_library"),
            Self::MavenApplication => write!(f, "maven_application"),
            Self::MavenLibrary => write!(f, "maven_library"),
            Self::DockerImage => write!(f, "docker_image"),
            Self::DockerApplication => write!(f, "docker_application"),
        }
    }
}

/// A declared dependency of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Dependency name.
    pub name: String,
    /// Declared version.
    pub version: String,
}

impl Dependency {
    /// Creates a new dependency.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Snapshot of what Nexus already holds for this project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestNexusVersions {
    /// Newest published release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release_version: Option<String>,
    /// Newest published pre-release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_pre_release_version: Option<String>,
}

impl LatestNexusVersions {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the latest release version.
    #[must_use]
    pub fn with_release(mut self, version: impl Into<String>) -> Self {
        self.latest_release_version = Some(version.into());
        self
    }

    /// Sets the latest pre-release version.
    #[must_use]
    pub fn with_pre_release(mut self, version: impl Into<String>) -> Self {
        self.latest_pre_release_version = Some(version.into());
        self
    }

    /// Returns true if neither version is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latest_release_version.is_none() && self.latest_pre_release_version.is_none()
    }
}

/// The project under release.
///
/// Descriptors are values: tasks never mutate one they were handed, they
/// return an updated copy built with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    /// What kind of project this is.
    pub project_type: ProjectType,
    /// Group (npm scope, Maven groupId). Empty when the ecosystem has none.
    #[serde(default)]
    pub group: String,
    /// Artifact name.
    pub name: String,
    /// Version being released.
    pub version: String,
    /// Whether `version` is a pre-release.
    pub is_pre_release: bool,
    /// Declared dependencies, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// What Nexus already holds, once fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_nexus_versions: Option<LatestNexusVersions>,
    /// Tag for the pre-release Docker image, once computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_pre_release_version: Option<String>,
}

impl ProjectDescriptor {
    /// Creates a descriptor, deriving `is_pre_release` from the version.
    #[must_use]
    pub fn new(
        project_type: ProjectType,
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let version = version.into();
        Self {
            project_type,
            group: group.into(),
            name: name.into(),
            is_pre_release: project_type.is_pre_release_version(&version),
            version,
            dependencies: Vec::new(),
            latest_nexus_versions: None,
            docker_pre_release_version: None,
        }
    }

    /// Overrides the pre-release flag.
    #[must_use]
    pub fn with_pre_release(mut self, is_pre_release: bool) -> Self {
        self.is_pre_release = is_pre_release;
        self
    }

    /// Sets the dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = Dependency>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Sets the Nexus history snapshot.
    #[must_use]
    pub fn with_latest_nexus_versions(mut self, versions: Option<LatestNexusVersions>) -> Self {
        self.latest_nexus_versions = versions;
        self
    }

    /// Sets the computed pre-release Docker version.
    #[must_use]
    pub fn with_docker_pre_release_version(mut self, version: impl Into<String>) -> Self {
        self.docker_pre_release_version = Some(version.into());
        self
    }

    /// The tag the Docker image gets: the pre-release version when one was
    /// computed, the plain version otherwise.
    #[must_use]
    pub fn docker_tag(&self) -> &str {
        self.docker_pre_release_version
            .as_deref()
            .unwrap_or(&self.version)
    }

    /// `group:name`, or just the name when there is no group.
    #[must_use]
    pub fn coordinates(&self) -> String {
        if self.group.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.group, self.name)
        }
    }
}
