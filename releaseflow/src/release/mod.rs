//! Release decisions: version validation, pre-release numbering, repository
//! history and descriptor checks.
//!
//! Each submodule exposes plain functions holding the rule and a task
//! builder wrapping that rule in a [`TaskRunner`](crate::tasks::TaskRunner)
//! with its skip predicates.

pub mod checks;
pub mod history;
pub mod prerelease;
pub mod resolver;

pub use checks::{
    check_dependencies, check_git_tag, check_pre_release_flag, pre_release_dependencies, validate_credentials_task,
    validate_dependencies_task, validate_git_tag_task, validate_pre_release_flag_task,
};
pub use history::{fetch_latest_nexus_versions, fetch_nexus_versions_task};
pub use prerelease::{
    bump_beta_number, compute_docker_pre_release_version, docker_pre_release_task, find_existing_beta_version,
    MAVEN_PRE_RELEASE_NOT_FOUND,
};
pub use resolver::{check_version, validate_version, validate_version_task, VERSION_NOT_HIGHER};
