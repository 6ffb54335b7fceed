//! Fetches the latest release and pre-release versions from Nexus.

use crate::core::{BuildMode, LatestNexusVersions, ProjectDescriptor, ProjectType, VersionCore};
use crate::errors::{BuildError, NexusError};
use crate::nexus::{NexusClient, NexusSearchResult};
use crate::tasks::{skip_when, TaskContext, TaskRunner};
use std::sync::Arc;

/// Name of the history task.
pub const FETCH_NEXUS_VERSIONS_TASK: &str = "fetch-nexus-versions";

fn first(result: &NexusSearchResult) -> Option<String> {
    result.first_version().map(str::to_string)
}

/// Looks up the newest release and pre-release of the project.
///
/// Returns `None` when Nexus holds neither.
///
/// # Errors
///
/// Propagates Nexus failures.
pub async fn fetch_latest_nexus_versions(
    nexus: &dyn NexusClient,
    descriptor: &ProjectDescriptor,
) -> Result<Option<LatestNexusVersions>, NexusError> {
    let (group, name) = (descriptor.group.as_str(), descriptor.name.as_str());

    let (release, pre_release) = match descriptor.project_type {
        ProjectType::NpmApplication | ProjectType::NpmLibrary => (
            first(&nexus.search_for_npm_releases(group, name, None).await?),
            first(&nexus.search_for_npm_betas(group, name, None).await?),
        ),
        ProjectType::MavenApplication | ProjectType::MavenLibrary => (
            first(&nexus.search_for_maven_releases(group, name, None).await?),
            first(&nexus.search_for_maven_snapshots(group, name, None).await?),
        ),
        ProjectType::DockerApplication | ProjectType::DockerImage => {
            let images = nexus.search_for_docker_releases(name).await?;
            // Floating tags such as `latest` carry no version.
            let (pre_releases, releases): (Vec<&str>, Vec<&str>) = images
                .versions()
                .filter(|v| VersionCore::parse(v).is_some())
                .partition(|v| v.contains('-'));
            (
                releases.first().map(|v| (*v).to_string()),
                pre_releases.first().map(|v| (*v).to_string()),
            )
        }
    };

    let latest = LatestNexusVersions {
        latest_release_version: release,
        latest_pre_release_version: pre_release,
    };
    Ok((!latest.is_empty()).then_some(latest))
}

/// Builds the history task, which fills `latest_nexus_versions`.
pub fn fetch_nexus_versions_task(
    stage_name: &str,
    mode: BuildMode,
    nexus: Arc<dyn NexusClient>,
) -> TaskRunner<ProjectDescriptor, ProjectDescriptor> {
    TaskRunner::new(stage_name, FETCH_NEXUS_VERSIONS_TASK, move |ctx: TaskContext<ProjectDescriptor>| {
        let nexus = Arc::clone(&nexus);
        async move {
            let latest = fetch_latest_nexus_versions(nexus.as_ref(), ctx.input())
                .await
                .map_err(|err| ctx.wrap_error(err))?;
            Ok::<_, BuildError>(ctx.into_input().with_latest_nexus_versions(latest))
        }
    })
    .skip_if(skip_when(
        "Docker images have no release history",
        |d: &ProjectDescriptor| d.project_type == ProjectType::DockerImage,
    ))
    .skip_if(skip_when("Deploy only build", move |_: &ProjectDescriptor| mode.is_deploy_only()))
    .with_summary(|d: &ProjectDescriptor| match &d.latest_nexus_versions {
        Some(latest) => format!(
            "Latest release {}, latest pre-release {}",
            latest.latest_release_version.as_deref().unwrap_or("none"),
            latest.latest_pre_release_version.as_deref().unwrap_or("none"),
        ),
        None => "No published versions".to_string(),
    })
}
