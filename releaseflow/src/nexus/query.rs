//! Query parameter sets for the Nexus search endpoint.

/// Repository holding Maven snapshots.
pub const MAVEN_SNAPSHOTS_REPOSITORY: &str = "maven-snapshots";
/// Repository holding Maven releases.
pub const MAVEN_RELEASES_REPOSITORY: &str = "maven-releases";
/// Repository holding Docker images.
pub const DOCKER_REPOSITORY: &str = "docker-private";

/// An ordered list of query parameters for `GET /search`.
///
/// Every constructor ends with `sort=version&direction=desc`, so the first
/// item of any response is the newest match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    params: Vec<(String, String)>,
}

impl SearchQuery {
    fn with(params: &[(&str, &str)], version: Option<(&str, &str)>) -> Self {
        let mut all: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        if let Some((key, value)) = version {
            all.push((key.to_string(), value.to_string()));
        }
        all.push(("sort".to_string(), "version".to_string()));
        all.push(("direction".to_string(), "desc".to_string()));
        Self { params: all }
    }

    /// Maven snapshots of `group:artifact`, optionally for one base version.
    #[must_use]
    pub fn maven_snapshots(group: &str, artifact: &str, version: Option<&str>) -> Self {
        Self::with(
            &[
                ("repository", MAVEN_SNAPSHOTS_REPOSITORY),
                ("maven.groupId", group),
                ("maven.artifactId", artifact),
            ],
            version.map(|v| ("maven.baseVersion", v)),
        )
    }

    /// Maven releases of `group:artifact`, optionally for one version.
    #[must_use]
    pub fn maven_releases(group: &str, artifact: &str, version: Option<&str>) -> Self {
        Self::with(
            &[
                ("repository", MAVEN_RELEASES_REPOSITORY),
                ("maven.groupId", group),
                ("maven.artifactId", artifact),
            ],
            version.map(|v| ("version", v)),
        )
    }

    /// npm pre-releases of `group/name`.
    #[must_use]
    pub fn npm_betas(group: &str, name: &str, version: Option<&str>) -> Self {
        Self::with(
            &[
                ("format", "npm"),
                ("group", group),
                ("name", name),
                ("prerelease", "true"),
            ],
            version.map(|v| ("version", v)),
        )
    }

    /// npm releases of `group/name`.
    #[must_use]
    pub fn npm_releases(group: &str, name: &str, version: Option<&str>) -> Self {
        Self::with(
            &[
                ("format", "npm"),
                ("group", group),
                ("name", name),
                ("prerelease", "false"),
            ],
            version.map(|v| ("version", v)),
        )
    }

    /// Docker images named `name`.
    #[must_use]
    pub fn docker_releases(name: &str) -> Self {
        Self::with(&[("repository", DOCKER_REPOSITORY), ("name", name)], None)
    }

    /// The parameters, in order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Looks up a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
