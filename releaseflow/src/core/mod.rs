//! Core domain model types for releaseflow.
//!
//! This module contains the values threaded through the pipeline:
//! - The project descriptor and project types
//! - Version core parsing
//! - Task status and build mode enums

mod project;
mod status;
mod version;

pub use project::{Dependency, LatestNexusVersions, ProjectDescriptor, ProjectType};
pub use status::{BuildMode, TaskStatus};
pub use version::{has_pre_release_qualifier, is_maven_snapshot, VersionCore};
