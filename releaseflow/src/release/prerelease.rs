//! Pre-release bumper: computes the Docker tag for a pre-release build.

use crate::core::{ProjectDescriptor, ProjectType};
use crate::errors::BuildError;
use crate::nexus::{NexusClient, NexusSearchResult};
use crate::tasks::{skip_unless, TaskContext, TaskRunner};
use std::sync::Arc;

/// Name of the pre-release version task.
pub const DOCKER_PRE_RELEASE_TASK: &str = "compute-docker-pre-release-version";

/// Failure message when no Maven snapshot exists yet.
pub const MAVEN_PRE_RELEASE_NOT_FOUND: &str =
    "Cannot find pre-release Maven artifact to determine pre-release Docker version";

/// Returns the first version in `result` that starts with `base_version`,
/// or `base_version` itself when none does.
#[must_use]
pub fn find_existing_beta_version(result: &NexusSearchResult, base_version: &str) -> String {
    result
        .versions()
        .find(|version| version.starts_with(base_version))
        .unwrap_or(base_version)
        .to_string()
}

/// Increments the trailing counter of a `<core>-beta[.N]` version.
///
/// Only the first `-` and the first `.` after it are significant; the label
/// is always rewritten as `beta` and a missing counter counts as zero.
///
/// # Errors
///
/// Fails when the version has no `-` qualifier or the counter is not a
/// number.
pub fn bump_beta_number(beta_version: &str) -> Result<String, String> {
    let (version_number, beta_part) = beta_version
        .split_once('-')
        .ok_or_else(|| format!("Cannot bump pre-release number of '{beta_version}': no pre-release qualifier"))?;

    let counter = match beta_part.split('.').nth(1) {
        Some(number) => number
            .parse::<u64>()
            .map_err(|_| format!("Cannot bump pre-release number of '{beta_version}': '{number}' is not a number"))?,
        None => 0,
    };

    let next = counter
        .checked_add(1)
        .ok_or_else(|| format!("Cannot bump pre-release number of '{beta_version}': counter overflows"))?;
    Ok(format!("{version_number}-beta.{next}"))
}

/// Computes `docker_pre_release_version` for the descriptor in `ctx`.
///
/// # Errors
///
/// Fails when Nexus cannot be queried, when a Maven application has no
/// snapshot yet, or when the project type has no pre-release image.
pub async fn compute_docker_pre_release_version(
    nexus: &dyn NexusClient,
    ctx: TaskContext<ProjectDescriptor>,
) -> Result<ProjectDescriptor, BuildError> {
    let descriptor = ctx.input();

    let version = match descriptor.project_type {
        ProjectType::NpmApplication => descriptor.version.clone(),
        ProjectType::MavenApplication => {
            let snapshots = nexus
                .search_for_maven_snapshots(&descriptor.group, &descriptor.name, None)
                .await
                .map_err(|err| ctx.wrap_error(err))?;
            snapshots
                .first_version()
                .ok_or_else(|| ctx.create_build_error(MAVEN_PRE_RELEASE_NOT_FOUND))?
                .to_string()
        }
        ProjectType::DockerApplication | ProjectType::DockerImage => {
            let images = nexus
                .search_for_docker_releases(&descriptor.name)
                .await
                .map_err(|err| ctx.wrap_error(err))?;
            let existing = find_existing_beta_version(&images, &descriptor.version);
            ctx.log(format!("Latest matching image version is {existing}"));
            bump_beta_number(&existing).map_err(|message| ctx.create_build_error(message))?
        }
        other => {
            return Err(ctx.create_build_error(format!(
                "Cannot determine pre-release Docker version for project type {other}"
            )))
        }
    };

    Ok(ctx.into_input().with_docker_pre_release_version(version))
}

/// Builds the pre-release version task.
///
/// Runs only for pre-release builds of Docker or application projects.
pub fn docker_pre_release_task(
    stage_name: &str,
    nexus: Arc<dyn NexusClient>,
) -> TaskRunner<ProjectDescriptor, ProjectDescriptor> {
    TaskRunner::new(stage_name, DOCKER_PRE_RELEASE_TASK, move |ctx: TaskContext<ProjectDescriptor>| {
        let nexus = Arc::clone(&nexus);
        async move { compute_docker_pre_release_version(nexus.as_ref(), ctx).await }
    })
    .skip_if(skip_unless(
        "Only Docker and application projects get a pre-release image",
        |d: &ProjectDescriptor| d.project_type.is_docker() || d.project_type.is_application(),
    ))
    .skip_if(skip_unless("Release build", |d: &ProjectDescriptor| d.is_pre_release))
    .with_summary(|d: &ProjectDescriptor| {
        format!(
            "Pre-release Docker version is {}",
            d.docker_pre_release_version.as_deref().unwrap_or_default()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingTaskLogger;
    use crate::nexus::NexusComponent;
    use crate::testing::InMemoryNexusClient;
    use pretty_assertions::assert_eq;

    fn result(versions: &[&str]) -> NexusSearchResult {
        NexusSearchResult::new(versions.iter().map(|v| NexusComponent::new("web", *v)).collect())
    }

    async fn run(nexus: InMemoryNexusClient, descriptor: ProjectDescriptor) -> Result<ProjectDescriptor, BuildError> {
        docker_pre_release_task("create-artifact", Arc::new(nexus))
            .with_logger(Arc::new(CollectingTaskLogger::new()))
            .run(descriptor)
            .await
    }

    #[test]
    fn test_bump_increments_counter() {
        assert_eq!(bump_beta_number("1.0.0-beta.2"), Ok("1.0.0-beta.3".to_string()));
        assert_eq!(bump_beta_number("1.0.0-beta.9"), Ok("1.0.0-beta.10".to_string()));
    }

    #[test]
    fn test_bump_defaults_missing_counter_to_zero() {
        assert_eq!(bump_beta_number("2.1.0-beta"), Ok("2.1.0-beta.1".to_string()));
    }

    #[test]
    fn test_bump_keeps_prefix_and_normalizes_label() {
        assert_eq!(bump_beta_number("3.0.0-rc.4"), Ok("3.0.0-beta.5".to_string()));
    }

    #[test]
    fn test_bump_parses_narrowly() {
        assert_eq!(bump_beta_number("1.0.0-beta.2-hotfix.7"), Err(
            "Cannot bump pre-release number of '1.0.0-beta.2-hotfix.7': '2-hotfix' is not a number".to_string()
        ));
        assert_eq!(bump_beta_number("1.0.0-beta.2.1"), Ok("1.0.0-beta.3".to_string()));
        assert!(bump_beta_number("1.0.0").is_err());
    }

    #[test]
    fn test_bump_rejects_counter_overflow() {
        assert_eq!(
            bump_beta_number("1.0.0-beta.18446744073709551615"),
            Err("Cannot bump pre-release number of '1.0.0-beta.18446744073709551615': counter overflows".to_string())
        );
        assert_eq!(
            bump_beta_number("1.0.0-beta.18446744073709551614"),
            Ok("1.0.0-beta.18446744073709551615".to_string())
        );
    }

    #[tokio::test]
    async fn test_overflowing_image_counter_becomes_build_error() {
        let nexus = InMemoryNexusClient::new().with_docker_releases(result(&["1.0.0-beta.18446744073709551615"]));
        let descriptor = ProjectDescriptor::new(ProjectType::DockerApplication, "", "web", "1.0.0-beta");

        let err = run(nexus, descriptor).await.unwrap_err();
        assert_eq!(err.task_name, DOCKER_PRE_RELEASE_TASK);
        assert!(err.message.ends_with("counter overflows"));
    }

    #[test]
    fn test_find_existing_beta_version() {
        let images = result(&["1.1.0-beta.1", "1.0.0-beta.2", "1.0.0-beta.1"]);
        assert_eq!(find_existing_beta_version(&images, "1.0.0-beta"), "1.0.0-beta.2");
        assert_eq!(find_existing_beta_version(&images, "2.0.0-beta"), "2.0.0-beta");
        assert_eq!(find_existing_beta_version(&NexusSearchResult::default(), "1.0.0-beta"), "1.0.0-beta");
    }

    #[tokio::test]
    async fn test_docker_application_bumps_existing_beta() {
        let nexus = InMemoryNexusClient::new().with_docker_releases(result(&["1.0.0-beta.2"]));
        let descriptor = ProjectDescriptor::new(ProjectType::DockerApplication, "", "web", "1.0.0-beta");

        let out = run(nexus, descriptor).await.unwrap();
        assert_eq!(out.docker_pre_release_version.as_deref(), Some("1.0.0-beta.3"));
    }

    #[tokio::test]
    async fn test_docker_application_without_prefix_match_starts_at_one() {
        let nexus = InMemoryNexusClient::new().with_docker_releases(result(&["1.1.0-beta.2"]));
        let descriptor = ProjectDescriptor::new(ProjectType::DockerApplication, "", "web", "1.0.0-beta");

        let out = run(nexus, descriptor).await.unwrap();
        assert_eq!(out.docker_pre_release_version.as_deref(), Some("1.0.0-beta.1"));
    }

    #[tokio::test]
    async fn test_maven_application_uses_newest_snapshot() {
        let nexus = InMemoryNexusClient::new()
            .with_maven_snapshots(result(&["1.4.0-20240102.080000-2", "1.4.0-20240101.120000-1"]));
        let descriptor = ProjectDescriptor::new(ProjectType::MavenApplication, "com.acme", "orders", "1.4.0-SNAPSHOT");

        let out = run(nexus.clone(), descriptor).await.unwrap();
        assert_eq!(out.docker_pre_release_version.as_deref(), Some("1.4.0-20240102.080000-2"));
        assert_eq!(nexus.calls(), vec!["maven_snapshots com.acme orders -"]);
    }

    #[tokio::test]
    async fn test_maven_application_without_snapshot_fails() {
        let nexus = InMemoryNexusClient::new();
        let descriptor = ProjectDescriptor::new(ProjectType::MavenApplication, "com.acme", "orders", "1.4.0-SNAPSHOT");

        let err = run(nexus, descriptor).await.unwrap_err();
        assert_eq!(err.message, MAVEN_PRE_RELEASE_NOT_FOUND);
        assert_eq!(err.task_name, DOCKER_PRE_RELEASE_TASK);
    }

    #[tokio::test]
    async fn test_npm_application_keeps_version() {
        let nexus = InMemoryNexusClient::new();
        let descriptor = ProjectDescriptor::new(ProjectType::NpmApplication, "@acme", "app", "2.0.0-beta.4");

        let out = run(nexus.clone(), descriptor).await.unwrap();
        assert_eq!(out.docker_pre_release_version.as_deref(), Some("2.0.0-beta.4"));
        assert!(nexus.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skipped_for_release_and_library_builds() {
        let nexus = InMemoryNexusClient::new();

        let release = ProjectDescriptor::new(ProjectType::DockerApplication, "", "web", "1.0.0");
        assert_eq!(run(nexus.clone(), release.clone()).await, Ok(release));

        let library = ProjectDescriptor::new(ProjectType::NpmLibrary, "@acme", "ui", "1.0.0-beta");
        assert_eq!(run(nexus.clone(), library.clone()).await, Ok(library));

        assert!(nexus.calls().is_empty());
    }

    #[tokio::test]
    async fn test_library_called_directly_is_rejected() {
        let nexus = InMemoryNexusClient::new();
        let ctx = TaskContext::new(
            "create-artifact",
            DOCKER_PRE_RELEASE_TASK,
            ProjectDescriptor::new(ProjectType::MavenLibrary, "com.acme", "lib", "1.0.0-SNAPSHOT"),
            Arc::new(CollectingTaskLogger::new()),
        );

        let err = compute_docker_pre_release_version(&nexus, ctx).await.unwrap_err();
        assert!(err.message.contains("maven_library"));
    }

    #[tokio::test]
    async fn test_nexus_failure_becomes_build_error() {
        let nexus = InMemoryNexusClient::new().failing("connection refused");
        let descriptor = ProjectDescriptor::new(ProjectType::DockerApplication, "", "web", "1.0.0-beta");

        let err = run(nexus, descriptor).await.unwrap_err();
        assert_eq!(err.stage_name, "create-artifact");
        assert!(err.message.contains("connection refused"));
    }
}
