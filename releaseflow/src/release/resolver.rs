//! Version resolver: may this version be released, given what Nexus holds?

use crate::core::{BuildMode, LatestNexusVersions, ProjectDescriptor, ProjectType, VersionCore};
use crate::errors::BuildError;
use crate::tasks::{skip_when, TaskContext, TaskRunner};

/// Name of the version validation task.
pub const VALIDATE_VERSION_TASK: &str = "validate-version";

/// Failure message for every history violation.
pub const VERSION_NOT_HIGHER: &str = "Project version is not higher than versions in Nexus";

fn parse_core(version: &str) -> Result<VersionCore, String> {
    VersionCore::parse(version)
        .ok_or_else(|| format!("Invalid version '{version}': expected a major.minor.patch version"))
}

/// Checks a candidate version against repository history.
///
/// A release is only compared with the latest release; a pre-release is
/// compared with both the latest release and the latest pre-release. Equal
/// cores pass.
///
/// # Errors
///
/// Returns the failure message when the candidate is lower than a
/// consulted version, or when a version has no numeric core.
pub fn check_version(version: &str, is_pre_release: bool, latest: &LatestNexusVersions) -> Result<(), String> {
    let candidate = parse_core(version)?;

    let mut floors = vec![latest.latest_release_version.as_deref()];
    if is_pre_release {
        floors.push(latest.latest_pre_release_version.as_deref());
    }

    for floor in floors.into_iter().flatten() {
        if candidate < parse_core(floor)? {
            return Err(VERSION_NOT_HIGHER.to_string());
        }
    }
    Ok(())
}

/// Validates the descriptor's version, returning it unchanged on success.
///
/// Without a history snapshot there is nothing to violate.
///
/// # Errors
///
/// Fails with a [`BuildError`] carrying the task's provenance.
pub fn validate_version(ctx: TaskContext<ProjectDescriptor>) -> Result<ProjectDescriptor, BuildError> {
    let descriptor = ctx.input();
    if let Some(latest) = &descriptor.latest_nexus_versions {
        check_version(&descriptor.version, descriptor.is_pre_release, latest)
            .map_err(|message| ctx.create_build_error(message))?;
    }
    Ok(ctx.into_input())
}

/// Builds the version validation task.
///
/// Skipped for plain Docker images and in deploy-only mode.
pub fn validate_version_task(stage_name: &str, mode: BuildMode) -> TaskRunner<ProjectDescriptor, ProjectDescriptor> {
    TaskRunner::new(stage_name, VALIDATE_VERSION_TASK, |ctx: TaskContext<ProjectDescriptor>| async move {
        validate_version(ctx)
    })
    .skip_if(skip_when(
        "Docker images have no release version to validate",
        |d: &ProjectDescriptor| d.project_type == ProjectType::DockerImage,
    ))
    .skip_if(skip_when("Deploy only build", move |_: &ProjectDescriptor| mode.is_deploy_only()))
    .with_summary(|d: &ProjectDescriptor| format!("Version {} can be released", d.version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingTaskLogger;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn descriptor(version: &str, is_pre_release: bool, latest: Option<LatestNexusVersions>) -> ProjectDescriptor {
        ProjectDescriptor::new(ProjectType::NpmApplication, "@acme", "app", version)
            .with_pre_release(is_pre_release)
            .with_latest_nexus_versions(latest)
    }

    async fn run(descriptor: ProjectDescriptor, mode: BuildMode) -> Result<ProjectDescriptor, BuildError> {
        validate_version_task("config-validation", mode)
            .with_logger(Arc::new(CollectingTaskLogger::new()))
            .run(descriptor)
            .await
    }

    #[tokio::test]
    async fn test_no_history_always_passes() {
        for (version, pre) in [("0.0.1", false), ("0.0.1-beta", true), ("not-a-version", false)] {
            let input = descriptor(version, pre, None);
            assert_eq!(run(input.clone(), BuildMode::Full).await, Ok(input));
        }
    }

    #[tokio::test]
    async fn test_release_ignores_pre_release_history() {
        let input = descriptor(
            "1.1.0",
            false,
            Some(LatestNexusVersions::new().with_release("1.0.0").with_pre_release("2.0.0-beta")),
        );
        assert_eq!(run(input.clone(), BuildMode::Full).await, Ok(input));
    }

    #[tokio::test]
    async fn test_pre_release_lower_than_pre_release_fails() {
        let input = descriptor(
            "1.1.0-beta",
            true,
            Some(LatestNexusVersions::new().with_release("1.0.0").with_pre_release("1.2.0-beta.1")),
        );
        let err = run(input, BuildMode::Full).await.unwrap_err();

        assert_eq!(err.message, VERSION_NOT_HIGHER);
        assert_eq!(err.stage_name, "config-validation");
        assert_eq!(err.task_name, VALIDATE_VERSION_TASK);
    }

    #[test]
    fn test_release_lower_than_release_fails() {
        let latest = LatestNexusVersions::new().with_release("1.2.0");
        assert_eq!(check_version("1.1.9", false, &latest), Err(VERSION_NOT_HIGHER.to_string()));
    }

    #[test]
    fn test_pre_release_lower_than_release_fails() {
        let latest = LatestNexusVersions::new().with_release("2.0.0");
        assert_eq!(check_version("1.9.0-beta", true, &latest), Err(VERSION_NOT_HIGHER.to_string()));
    }

    #[test]
    fn test_equal_cores_pass() {
        let latest = LatestNexusVersions::new().with_release("1.2.0").with_pre_release("1.2.0-beta.4");
        assert_eq!(check_version("1.2.0", false, &latest), Ok(()));
        assert_eq!(check_version("1.2.0-beta", true, &latest), Ok(()));
    }

    #[test]
    fn test_pre_release_checks_both_floors() {
        let latest = LatestNexusVersions::new().with_release("1.0.0").with_pre_release("1.3.0-beta.1");
        assert_eq!(check_version("1.4.0-beta", true, &latest), Ok(()));
        assert!(check_version("1.2.0-beta", true, &latest).is_err());
    }

    #[test]
    fn test_missing_floors_are_not_consulted() {
        assert_eq!(check_version("0.1.0", false, &LatestNexusVersions::new()), Ok(()));
        let only_pre = LatestNexusVersions::new().with_pre_release("9.0.0-beta");
        assert_eq!(check_version("0.1.0", false, &only_pre), Ok(()));
    }

    #[test]
    fn test_invalid_version_is_reported() {
        let latest = LatestNexusVersions::new().with_release("1.0.0");
        let err = check_version("next", false, &latest).unwrap_err();
        assert!(err.contains("Invalid version 'next'"));
    }

    #[tokio::test]
    async fn test_skipped_for_docker_image_and_deploy_only() {
        let failing_history = Some(LatestNexusVersions::new().with_release("9.9.9"));

        let image = ProjectDescriptor::new(ProjectType::DockerImage, "", "base", "1.0.0")
            .with_latest_nexus_versions(failing_history.clone());
        assert_eq!(run(image.clone(), BuildMode::Full).await, Ok(image));

        let app = descriptor("1.0.0", false, failing_history);
        assert_eq!(run(app.clone(), BuildMode::DeployOnly).await, Ok(app.clone()));
        assert!(run(app, BuildMode::Full).await.is_err());
    }
}
