//! Consistency checks on the descriptor and its surroundings.

use crate::collaborators::{CredentialSource, GitTagLister};
use crate::core::{BuildMode, Dependency, ProjectDescriptor};
use crate::errors::BuildError;
use crate::tasks::{skip_when, TaskContext, TaskRunner};
use std::sync::Arc;

/// Name of the pre-release flag check.
pub const VALIDATE_PRE_RELEASE_FLAG_TASK: &str = "validate-pre-release-flag";
/// Name of the dependency check.
pub const VALIDATE_DEPENDENCIES_TASK: &str = "validate-dependencies";
/// Name of the git tag check.
pub const VALIDATE_GIT_TAG_TASK: &str = "validate-git-tag";
/// Name of the credentials check.
pub const VALIDATE_CREDENTIALS_TASK: &str = "validate-credentials";

/// Fails when the version's qualifier disagrees with `is_pre_release`.
///
/// # Errors
///
/// Returns the mismatch message.
pub fn check_pre_release_flag(descriptor: &ProjectDescriptor) -> Result<(), String> {
    if descriptor.project_type.is_pre_release_version(&descriptor.version) == descriptor.is_pre_release {
        Ok(())
    } else {
        Err(format!(
            "Project version {} does not match pre-release flag {}",
            descriptor.version, descriptor.is_pre_release
        ))
    }
}

/// Dependencies whose versions are pre-releases for this project type.
#[must_use]
pub fn pre_release_dependencies(descriptor: &ProjectDescriptor) -> Vec<&Dependency> {
    descriptor
        .dependencies
        .iter()
        .filter(|dep| descriptor.project_type.is_pre_release_version(&dep.version))
        .collect()
}

/// Fails when a release depends on pre-release versions.
///
/// # Errors
///
/// Returns a message listing every offending dependency.
pub fn check_dependencies(descriptor: &ProjectDescriptor) -> Result<(), String> {
    let offending = pre_release_dependencies(descriptor);
    if offending.is_empty() {
        return Ok(());
    }
    let list = offending
        .iter()
        .map(|dep| format!("{}@{}", dep.name, dep.version))
        .collect::<Vec<_>>()
        .join(", ");
    Err(format!("Release cannot depend on pre-release versions: {list}"))
}

/// Fails when `version` (or `v<version>`) is among the newline-separated
/// `tags`.
///
/// # Errors
///
/// Returns the already-tagged message.
pub fn check_git_tag(tags: &str, version: &str) -> Result<(), String> {
    let prefixed = format!("v{version}");
    let tagged = tags
        .lines()
        .map(str::trim)
        .any(|tag| tag == version || tag == prefixed);
    if tagged {
        Err(format!("Version {version} is already tagged"))
    } else {
        Ok(())
    }
}

fn check(
    ctx: TaskContext<ProjectDescriptor>,
    rule: impl Fn(&ProjectDescriptor) -> Result<(), String>,
) -> Result<ProjectDescriptor, BuildError> {
    rule(ctx.input()).map_err(|message| ctx.create_build_error(message))?;
    Ok(ctx.into_input())
}

/// Builds the pre-release flag check.
pub fn validate_pre_release_flag_task(stage_name: &str) -> TaskRunner<ProjectDescriptor, ProjectDescriptor> {
    TaskRunner::new(stage_name, VALIDATE_PRE_RELEASE_FLAG_TASK, |ctx: TaskContext<ProjectDescriptor>| async move {
        check(ctx, check_pre_release_flag)
    })
}

/// Builds the dependency check. Pre-release builds may depend on anything.
pub fn validate_dependencies_task(stage_name: &str) -> TaskRunner<ProjectDescriptor, ProjectDescriptor> {
    TaskRunner::new(stage_name, VALIDATE_DEPENDENCIES_TASK, |ctx: TaskContext<ProjectDescriptor>| async move {
        check(ctx, check_dependencies)
    })
    .skip_if(skip_when("Pre-release build", |d: &ProjectDescriptor| d.is_pre_release))
    .with_summary(|d: &ProjectDescriptor| format!("{} dependencies checked", d.dependencies.len()))
}

/// Builds the git tag check.
pub fn validate_git_tag_task(
    stage_name: &str,
    mode: BuildMode,
    git: Arc<dyn GitTagLister>,
) -> TaskRunner<ProjectDescriptor, ProjectDescriptor> {
    TaskRunner::new(stage_name, VALIDATE_GIT_TAG_TASK, move |ctx: TaskContext<ProjectDescriptor>| {
        let git = Arc::clone(&git);
        async move {
            let tags = git.list_tags().await.map_err(|err| ctx.wrap_error(format!("{err:#}")))?;
            let version = ctx.input().version.clone();
            check(ctx, |_| check_git_tag(&tags, &version))
        }
    })
    .skip_if(skip_when("Pre-release build", |d: &ProjectDescriptor| d.is_pre_release))
    .skip_if(skip_when("Deploy only build", move |_: &ProjectDescriptor| mode.is_deploy_only()))
}

/// Builds the credentials check.
pub fn validate_credentials_task(
    stage_name: &str,
    credentials: Arc<dyn CredentialSource>,
) -> TaskRunner<ProjectDescriptor, ProjectDescriptor> {
    TaskRunner::new(stage_name, VALIDATE_CREDENTIALS_TASK, move |ctx: TaskContext<ProjectDescriptor>| {
        let credentials = Arc::clone(&credentials);
        async move {
            let found = credentials
                .credentials()
                .await
                .map_err(|err| ctx.wrap_error(format!("{err:#}")))?;
            ctx.log(format!("Using credentials of {}", found.user_name));
            Ok::<_, BuildError>(ctx.into_input())
        }
    })
}
