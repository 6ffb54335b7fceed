//! Testing utilities for release pipelines.
//!
//! This module provides:
//! - An in-memory Nexus client and collaborator doubles
//! - Descriptor and search-result fixtures
//! - Assertions over task logs and build errors

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_build_error, assert_task_not_run, assert_task_skipped, assert_task_succeeded};
pub use fixtures::{docker_application, maven_application, npm_application, search_result, DescriptorFixture};
pub use mocks::{
    InMemoryNexusClient, RecordingDeployer, RecordingShellExecutor, StaticCredentials, StaticGitTags,
    StaticProjectIdentifier,
};
