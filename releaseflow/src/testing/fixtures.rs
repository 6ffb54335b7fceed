//! Descriptor and search-result fixtures.

use crate::core::{Dependency, ProjectDescriptor, ProjectType};
use crate::nexus::{NexusComponent, NexusSearchResult};

/// A search result listing `versions` in the given order, as Nexus would
/// return them for `name`.
#[must_use]
pub fn search_result(name: &str, versions: &[&str]) -> NexusSearchResult {
    NexusSearchResult::new(
        versions
            .iter()
            .map(|version| NexusComponent::new(name, *version))
            .collect(),
    )
}

/// Builder for test descriptors with sensible coordinates per project type.
#[derive(Debug, Clone)]
pub struct DescriptorFixture {
    project_type: ProjectType,
    version: String,
    dependencies: Vec<Dependency>,
}

impl DescriptorFixture {
    /// Starts a fixture of the given type and version.
    pub fn new(project_type: ProjectType, version: impl Into<String>) -> Self {
        Self {
            project_type,
            version: version.into(),
            dependencies: Vec::new(),
        }
    }

    /// Adds a dependency.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependencies.push(Dependency::new(name, version));
        self
    }

    /// Builds the descriptor.
    #[must_use]
    pub fn build(self) -> ProjectDescriptor {
        let (group, name) = match self.project_type {
            ProjectType::NpmApplication => ("@acme", "storefront"),
            ProjectType::NpmLibrary => ("@acme", "ui-kit"),
            ProjectType::MavenApplication => ("com.acme", "orders"),
            ProjectType::MavenLibrary => ("com.acme", "commons"),
            ProjectType::DockerApplication => ("", "gateway"),
            ProjectType::DockerImage => ("", "base-image"),
        };
        ProjectDescriptor::new(self.project_type, group, name, self.version).with_dependencies(self.dependencies)
    }
}

/// A released npm application.
#[must_use]
pub fn npm_application(version: &str) -> ProjectDescriptor {
    DescriptorFixture::new(ProjectType::NpmApplication, version).build()
}

/// A Maven application.
#[must_use]
pub fn maven_application(version: &str) -> ProjectDescriptor {
    DescriptorFixture::new(ProjectType::MavenApplication, version).build()
}

/// A Docker application.
#[must_use]
pub fn docker_application(version: &str) -> ProjectDescriptor {
    DescriptorFixture::new(ProjectType::DockerApplication, version).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixture_derives_pre_release_flag() {
        assert!(maven_application("1.0.0-SNAPSHOT").is_pre_release);
        assert!(!maven_application("1.0.0-rc1").is_pre_release);
        assert!(docker_application("1.0.0-beta").is_pre_release);
    }

    #[test]
    fn test_fixture_dependencies() {
        let descriptor = DescriptorFixture::new(ProjectType::NpmLibrary, "1.0.0")
            .with_dependency("react", "18.2.0")
            .build();
        assert_eq!(descriptor.name, "ui-kit");
        assert_eq!(descriptor.dependencies, vec![Dependency::new("react", "18.2.0")]);
    }

    #[test]
    fn test_search_result_keeps_order() {
        let result = search_result("gateway", &["2.0.0", "1.0.0"]);
        assert_eq!(result.versions().collect::<Vec<_>>(), vec!["2.0.0", "1.0.0"]);
    }
}
